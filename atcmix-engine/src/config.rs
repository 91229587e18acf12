//! Engine configuration and documented gain defaults

/// Default ATC channel gain, applied at graph construction.
///
/// Also what [`crate::mixer::MixerEngine::get_atc_volume`] reports before the
/// graph exists, so the UI can render a sane slider position pre-init.
pub const DEFAULT_ATC_GAIN: f32 = 0.7;

/// Default music channel gain (see [`DEFAULT_ATC_GAIN`] for the pre-init role)
pub const DEFAULT_MUSIC_GAIN: f32 = 0.5;

/// Default master bus gain
pub const DEFAULT_MASTER_GAIN: f32 = 1.0;

/// Default crossfade duration in audio-clock seconds
pub const DEFAULT_FADE_SECONDS: f64 = 0.5;

/// Mixer engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Initial ATC channel gain
    pub atc_gain: f32,

    /// Initial music channel gain
    pub music_gain: f32,

    /// Initial master bus gain
    pub master_gain: f32,

    /// Crossfade duration used when the caller does not supply one
    pub fade_seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            atc_gain: DEFAULT_ATC_GAIN,
            music_gain: DEFAULT_MUSIC_GAIN,
            master_gain: DEFAULT_MASTER_GAIN,
            fade_seconds: DEFAULT_FADE_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.atc_gain, 0.7);
        assert_eq!(config.music_gain, 0.5);
        assert_eq!(config.master_gain, 1.0);
        assert_eq!(config.fade_seconds, 0.5);
    }
}

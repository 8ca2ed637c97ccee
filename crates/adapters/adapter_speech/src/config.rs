//! Speech configuration (`[speech]` section).

use std::path::PathBuf;

use serde::Deserialize;

/// Whisper transcription server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    pub enabled: bool,
    pub server_url: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: "http://localhost:9881".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Which synthesis engine speaks replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsBackend {
    /// Replies are text only.
    #[default]
    None,
    Piper,
    #[serde(alias = "eleven_labs")]
    ElevenLabs,
    #[serde(alias = "gpt_sovits")]
    GptSovits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PiperConfig {
    /// Executable name or path.
    pub executable: PathBuf,
    /// `.onnx` voice model.
    pub model_path: PathBuf,
    /// Output rate of the voice model, in Hz.
    pub sample_rate: u32,
}

impl Default for PiperConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("piper"),
            model_path: PathBuf::from("models/en_GB-jenny_dioco-medium.onnx"),
            sample_rate: 22_050,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElevenLabsConfig {
    pub api_key: Option<String>,
    pub voice_id: String,
    pub model_id: String,
    pub base_url: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub timeout_secs: u64,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            model_id: "eleven_monolingual_v1".to_string(),
            base_url: "https://api.elevenlabs.io".to_string(),
            stability: 0.5,
            similarity_boost: 0.75,
            timeout_secs: 30,
        }
    }
}

impl ElevenLabsConfig {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Local GPT-SoVITS voice-cloning server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GptSovitsConfig {
    pub server_url: String,
    /// Sample of the voice to clone, as a path the server can read.
    pub reference_audio: String,
    /// Transcript of `reference_audio`.
    pub reference_text: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for GptSovitsConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9880".to_string(),
            reference_audio: "reference_audio/default.wav".to_string(),
            reference_text: "Hello, this is a reference audio sample.".to_string(),
            language: "en".to_string(),
            timeout_secs: 60,
        }
    }
}

/// External program that writes a mono 16-bit WAV recording to stdout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub program: String,
    pub sample_rate: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            program: "arecord".to_string(),
            sample_rate: 16_000,
        }
    }
}

/// External player fed WAV or MP3 on stdin, or given a file path.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub program: String,
    /// Arguments placed before the input.
    pub args: Vec<String>,
    /// Input argument standing for stdin.
    pub stdin_input: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            program: "ffplay".to_string(),
            args: ["-nodisp", "-autoexit", "-loglevel", "error"]
                .map(String::from)
                .to_vec(),
            stdin_input: "pipe:0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub whisper: WhisperConfig,
    pub tts: TtsBackend,
    pub piper: PiperConfig,
    pub elevenlabs: ElevenLabsConfig,
    pub gptsovits: GptSovitsConfig,
    pub recorder: RecorderConfig,
    pub player: PlayerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = SpeechConfig::default();
        assert!(!config.whisper.enabled);
        assert_eq!(config.whisper.server_url, "http://localhost:9881");
        assert_eq!(config.tts, TtsBackend::None);
        assert_eq!(config.elevenlabs.voice_id, "21m00Tcm4TlvDq8ikWAM");
        assert_eq!(config.recorder.sample_rate, 16_000);
        assert_eq!(config.gptsovits.server_url, "http://localhost:9880");
        assert_eq!(config.player.program, "ffplay");
    }

    #[test]
    fn should_read_gptsovits_and_player_sections() {
        let toml = r#"
            tts = "gptsovits"

            [gptsovits]
            reference_audio = "voices/me.wav"
            language = "ja"

            [player]
            program = "mpv"
            args = ["--no-video", "--really-quiet"]
            stdin_input = "-"
        "#;
        let config: SpeechConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.tts, TtsBackend::GptSovits);
        assert_eq!(config.gptsovits.reference_audio, "voices/me.wav");
        assert_eq!(config.gptsovits.language, "ja");
        assert_eq!(config.gptsovits.server_url, "http://localhost:9880");
        assert_eq!(config.player.program, "mpv");
        assert_eq!(config.player.stdin_input, "-");
    }

    #[test]
    fn should_deserialize_nested_tables_from_toml() {
        let toml = r#"
            tts = "elevenlabs"

            [whisper]
            enabled = true
            server_url = "http://10.0.0.5:9881"

            [elevenlabs]
            api_key = "xi-123"
        "#;
        let config: SpeechConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.tts, TtsBackend::ElevenLabs);
        assert!(config.whisper.enabled);
        assert_eq!(config.whisper.timeout_secs, 30);
        assert_eq!(config.elevenlabs.api_key(), Some("xi-123"));
        assert_eq!(config.elevenlabs.model_id, "eleven_monolingual_v1");
        assert_eq!(config.piper.executable, PathBuf::from("piper"));
    }
}

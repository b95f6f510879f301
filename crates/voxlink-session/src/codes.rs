//! Engine error code to user-facing message lookup.
//!
//! Unknown codes pass through raw so a new engine version's errors are
//! still visible to the user.

/// Map an engine-reported error code to a user-facing message.
pub fn describe(code: &str) -> String {
    match code {
        "mic_unavailable" => "Microphone is unavailable or in use by another application",
        "model_load_failed" => "Speech model failed to load",
        "model_not_found" => "Selected speech model is not installed",
        "transcription_failed" => "Transcription failed, please try again",
        "already_recording" => "The engine is already recording",
        other => return other.to_string(),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_are_mapped() {
        assert_eq!(
            describe("mic_unavailable"),
            "Microphone is unavailable or in use by another application"
        );
        assert_eq!(describe("model_load_failed"), "Speech model failed to load");
        assert_eq!(
            describe("transcription_failed"),
            "Transcription failed, please try again"
        );
    }

    #[test]
    fn test_unknown_code_passes_through_raw() {
        assert_eq!(describe("gpu_on_fire"), "gpu_on_fire");
        assert_eq!(describe(""), "");
    }
}

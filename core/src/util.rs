pub trait OptionPathExt {
    fn as_opt_path(&self) -> Option<&camino::Utf8Path>;
}

impl OptionPathExt for Option<camino::Utf8PathBuf> {
    fn as_opt_path(&self) -> Option<&camino::Utf8Path> {
        self.as_ref().map(|p| p.as_path())
    }
}

/// Program name to run when no explicit binary path is configured.
pub fn bin_or_default<'a>(bin_path: Option<&'a camino::Utf8Path>, default: &'a str) -> &'a str {
    bin_path.map(|p| p.as_str()).unwrap_or(default)
}

#[test]
fn bin_path_falls_back_to_program_name() {
    let configured: Option<camino::Utf8PathBuf> = Some("/opt/ffmpeg/bin/ffprobe".into());
    assert_eq!(
        bin_or_default(configured.as_opt_path(), "ffprobe"),
        "/opt/ffmpeg/bin/ffprobe"
    );
    let unset: Option<camino::Utf8PathBuf> = None;
    assert_eq!(bin_or_default(unset.as_opt_path(), "ffprobe"), "ffprobe");
}

/// Whether a web browser is likely usable on this device.
///
/// VR headsets and Android devices without a touchscreen (TV boxes) are
/// assumed to have none; long URLs should be avoided there.
pub fn is_browser_likely_available(platform: &str, vr_mode: bool, has_touchscreen: bool) -> bool {
    !(vr_mode || (platform == "android" && !has_touchscreen))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_heuristic() {
        assert!(is_browser_likely_available("android", false, true));
        assert!(!is_browser_likely_available("android", false, false));
        assert!(!is_browser_likely_available("windows", true, false));
        assert!(is_browser_likely_available("mac", false, false));
    }
}

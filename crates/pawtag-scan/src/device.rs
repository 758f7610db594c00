//! Device fingerprinting from request metadata.
//!
//! Pure classification, no I/O. [`describe`] is total: any input,
//! including garbage, yields a `DeviceInfo` whose fields are all
//! defined strings, with `"Unknown"` for anything unclassifiable.

use pawtag_core::models::scan_event::DeviceInfo;

pub const UNKNOWN: &str = "Unknown";

/// Request-side metadata a scan handler can forward for
/// fingerprinting. Everything is optional; absent values classify
/// as `"Unknown"`.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub language: Option<String>,
}

/// Derives a best-effort device descriptor from request metadata.
pub fn describe(client: &ClientContext) -> DeviceInfo {
    let ua = client.user_agent.as_deref().unwrap_or("");
    let ua_lower = ua.to_lowercase();

    DeviceInfo {
        user_agent: if ua.is_empty() {
            UNKNOWN.to_string()
        } else {
            ua.to_string()
        },
        platform: normalize(client.platform.as_deref()),
        language: normalize(client.language.as_deref()),
        browser: classify_browser(&ua_lower).to_string(),
        os: classify_os(&ua_lower).to_string(),
        device_class: classify_device(&ua_lower).to_string(),
    }
}

fn normalize(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// First match wins. Ordering matters: Edge user agents contain
/// `chrome`, and almost every browser on the planet claims `safari`.
fn classify_browser(ua: &str) -> &'static str {
    if ua.contains("firefox") {
        "Firefox"
    } else if ua.contains("samsungbrowser") {
        "Samsung Browser"
    } else if ua.contains("opera") || ua.contains("opr/") {
        "Opera"
    } else if ua.contains("trident") || ua.contains("msie") {
        "Internet Explorer"
    } else if ua.contains("edg") {
        "Edge"
    } else if ua.contains("chrome") || ua.contains("crios") {
        "Chrome"
    } else if ua.contains("safari") {
        "Safari"
    } else {
        UNKNOWN
    }
}

/// Mobile tokens are tested before the desktop tokens they embed:
/// Android user agents contain `Linux`, and iOS user agents contain
/// `like Mac OS X`.
fn classify_os(ua: &str) -> &'static str {
    if ua.contains("windows") {
        "Windows"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        "MacOS"
    } else if ua.contains("linux") || ua.contains("x11") {
        "Linux"
    } else {
        UNKNOWN
    }
}

fn classify_device(ua: &str) -> &'static str {
    let tablet = ["ipad", "tablet", "kindle", "silk", "playbook"];
    if tablet.iter().any(|t| ua.contains(t)) {
        return "Tablet";
    }
    let mobile = ["mobi", "iphone", "ipod", "android", "windows phone", "opera mini"];
    if mobile.iter().any(|t| ua.contains(t)) {
        return "Mobile";
    }
    "Desktop"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe_ua(ua: &str) -> DeviceInfo {
        describe(&ClientContext {
            user_agent: Some(ua.to_string()),
            platform: None,
            language: None,
        })
    }

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
         AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const FIREFOX_ANDROID: &str =
        "Mozilla/5.0 (Android 13; Mobile; rv:120.0) Gecko/120.0 Firefox/120.0";
    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const ANDROID_CHROME: &str = "Mozilla/5.0 (Linux; Android 10; SM-G973F) \
         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Mobile Safari/537.36";

    #[test]
    fn classifies_desktop_chrome_on_windows() {
        let info = describe_ua(CHROME_WIN);
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.os, "Windows");
        assert_eq!(info.device_class, "Desktop");
    }

    #[test]
    fn classifies_safari_on_iphone() {
        let info = describe_ua(SAFARI_IPHONE);
        assert_eq!(info.browser, "Safari");
        assert_eq!(info.os, "iOS");
        assert_eq!(info.device_class, "Mobile");
    }

    #[test]
    fn classifies_firefox_on_android() {
        let info = describe_ua(FIREFOX_ANDROID);
        assert_eq!(info.browser, "Firefox");
        assert_eq!(info.os, "Android");
        assert_eq!(info.device_class, "Mobile");
    }

    #[test]
    fn edge_wins_over_chrome_token() {
        let info = describe_ua(EDGE_WIN);
        assert_eq!(info.browser, "Edge");
    }

    #[test]
    fn android_is_not_misread_as_linux() {
        let info = describe_ua(ANDROID_CHROME);
        assert_eq!(info.os, "Android");
        assert_eq!(info.device_class, "Mobile");
    }

    #[test]
    fn iphone_is_not_misread_as_macos() {
        // iOS user agents carry "like Mac OS X".
        let info = describe_ua(SAFARI_IPHONE);
        assert_eq!(info.os, "iOS");
    }

    #[test]
    fn plain_macintosh_is_still_macos() {
        let info = describe_ua(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
             AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
        );
        assert_eq!(info.os, "MacOS");
        assert_eq!(info.device_class, "Desktop");
    }

    #[test]
    fn ipad_is_tablet() {
        let info = describe_ua(
            "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X) \
             AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Safari/605.1.15",
        );
        assert_eq!(info.os, "iOS");
        assert_eq!(info.device_class, "Tablet");
    }

    #[test]
    fn empty_input_is_all_unknown_desktop() {
        let info = describe(&ClientContext::default());
        assert_eq!(info.user_agent, UNKNOWN);
        assert_eq!(info.platform, UNKNOWN);
        assert_eq!(info.language, UNKNOWN);
        assert_eq!(info.browser, UNKNOWN);
        assert_eq!(info.os, UNKNOWN);
        assert_eq!(info.device_class, "Desktop");
    }

    #[test]
    fn describe_is_total_over_random_input() {
        use rand::Rng;
        let mut rng = rand::rng();

        for _ in 0..1_000 {
            let len = rng.random_range(0..256);
            let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            let garbage = String::from_utf8_lossy(&bytes).into_owned();

            let info = describe(&ClientContext {
                user_agent: Some(garbage.clone()),
                platform: Some(garbage.clone()),
                language: Some(garbage),
            });

            assert!(!info.user_agent.is_empty());
            assert!(!info.platform.is_empty());
            assert!(!info.language.is_empty());
            assert!(!info.browser.is_empty());
            assert!(!info.os.is_empty());
            assert!(!info.device_class.is_empty());
        }
    }
}

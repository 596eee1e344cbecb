//! User-Agent 归类
//!
//! 用固定顺序的子串签名表做首次匹配，不做完整 UA 解析。
//! 表的顺序就是语义：Edge 的 UA 里同时含有 "chrome"，所以 "edg" 必须排在前面。

/// 粗粒度的客户端归类，供点击聚合使用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile {
    pub device_type: String,
    pub browser: String,
    pub os: String,
}

// (签名, 归类) 按优先级排列，首个命中的生效
const DEVICE_SIGNATURES: &[(&str, &str)] = &[
    ("ipad", "tablet"),
    ("tablet", "tablet"),
    ("mobile", "mobile"),
    ("iphone", "mobile"),
    ("android", "mobile"),
];

const BROWSER_SIGNATURES: &[(&str, &str)] = &[
    ("edg", "Edge"),
    ("opr", "Opera"),
    ("opera", "Opera"),
    ("chrome", "Chrome"),
    ("safari", "Safari"),
    ("firefox", "Firefox"),
    ("msie", "Internet Explorer"),
    ("trident", "Internet Explorer"),
];

// android 的 UA 含 "linux"，所以 android 在 linux 之前
const OS_SIGNATURES: &[(&str, &str)] = &[
    ("windows", "Windows"),
    ("android", "Android"),
    ("iphone", "iOS"),
    ("ipad", "iOS"),
    ("ios", "iOS"),
    ("mac os", "macOS"),
    ("linux", "Linux"),
];

fn first_match(haystack: &str, table: &[(&str, &str)], fallback: &str) -> String {
    table
        .iter()
        .find(|(sig, _)| haystack.contains(sig))
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// 从原始 UA 字符串派生设备、浏览器和操作系统。
/// 缺失或空 UA 按桌面 / Unknown 处理。
pub fn classify(user_agent: Option<&str>) -> ClientProfile {
    let ua = match user_agent {
        Some(ua) if !ua.trim().is_empty() => ua.to_lowercase(),
        _ => {
            return ClientProfile {
                device_type: "desktop".to_string(),
                browser: "Unknown".to_string(),
                os: "Unknown".to_string(),
            };
        }
    };

    ClientProfile {
        device_type: first_match(&ua, DEVICE_SIGNATURES, "desktop"),
        browser: first_match(&ua, BROWSER_SIGNATURES, "Unknown"),
        os: first_match(&ua, OS_SIGNATURES, "Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

    #[test]
    fn test_edge_wins_over_chrome() {
        let profile = classify(Some(EDGE_WIN));
        assert_eq!(profile.browser, "Edge");
        assert_eq!(profile.os, "Windows");
        assert_eq!(profile.device_type, "desktop");
    }

    #[test]
    fn test_chrome_on_windows() {
        let profile = classify(Some(CHROME_WIN));
        assert_eq!(profile.browser, "Chrome");
        assert_eq!(profile.os, "Windows");
        assert_eq!(profile.device_type, "desktop");
    }

    #[test]
    fn test_iphone_is_mobile_ios() {
        let profile = classify(Some(SAFARI_IPHONE));
        assert_eq!(profile.device_type, "mobile");
        assert_eq!(profile.os, "iOS");
        assert_eq!(profile.browser, "Safari");
    }

    #[test]
    fn test_ipad_is_tablet() {
        let profile = classify(Some(SAFARI_IPAD));
        assert_eq!(profile.device_type, "tablet");
        assert_eq!(profile.os, "iOS");
    }

    #[test]
    fn test_android_beats_linux() {
        let profile = classify(Some(CHROME_ANDROID));
        assert_eq!(profile.os, "Android");
        assert_eq!(profile.device_type, "mobile");
    }

    #[test]
    fn test_firefox_on_linux() {
        let profile = classify(Some(FIREFOX_LINUX));
        assert_eq!(profile.browser, "Firefox");
        assert_eq!(profile.os, "Linux");
    }

    #[test]
    fn test_missing_ua_defaults() {
        let profile = classify(None);
        assert_eq!(profile.device_type, "desktop");
        assert_eq!(profile.browser, "Unknown");
        assert_eq!(profile.os, "Unknown");

        assert_eq!(classify(Some("  ")), profile);
    }
}

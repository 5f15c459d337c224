//! User-agent parsing backed by woothee.

use ingest_core::{ParsedUa, UaResolver};
use woothee::parser::Parser;

const UNKNOWN: &str = "UNKNOWN";
const CRAWLER_CATEGORY: &str = "crawler";

pub struct WootheeUaResolver {
    parser: Parser
}

impl WootheeUaResolver {
    pub fn new() -> Self {
        Self {
            parser: Parser::new()
        }
    }
}

impl Default for WootheeUaResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn known(value: &str) -> String {
    if value == UNKNOWN {
        String::new()
    } else {
        value.to_string()
    }
}

impl UaResolver for WootheeUaResolver {
    fn resolve(&self, user_agent: &str) -> ParsedUa {
        let Some(result) = self.parser.parse(user_agent) else {
            return ParsedUa::default();
        };

        ParsedUa {
            ua_family: known(&result.name),
            ua_version: known(&result.version),
            os_family: known(&result.os),
            os_version: known(&result.os_version),
            device_family: known(&result.category),
            bot: result.category == CRAWLER_CATEGORY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/83.0.4103.116 Safari/537.36";
    const GOOGLEBOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    #[test]
    fn test_desktop_browser() {
        let parsed = WootheeUaResolver::new().resolve(CHROME_WINDOWS);
        assert_eq!(parsed.ua_family, "Chrome");
        assert_eq!(parsed.device_family, "pc");
        assert!(parsed.os_family.starts_with("Windows"));
        assert!(!parsed.bot);
    }

    #[test]
    fn test_crawler_is_flagged() {
        let parsed = WootheeUaResolver::new().resolve(GOOGLEBOT);
        assert_eq!(parsed.ua_family, "Googlebot");
        assert!(parsed.bot);
    }

    #[test]
    fn test_garbage_yields_no_unknown_markers() {
        let parsed = WootheeUaResolver::new().resolve("definitely-not-a-browser");
        assert_ne!(parsed.ua_family, UNKNOWN);
        assert_ne!(parsed.os_family, UNKNOWN);
        assert!(!parsed.bot);
    }

    #[test]
    fn test_known_normalizes_unknown() {
        assert_eq!(known("UNKNOWN"), "");
        assert_eq!(known("Firefox"), "Firefox");
    }
}

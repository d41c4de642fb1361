//! `application/x-www-form-urlencoded` decoding for the topic form.

/// Value of the first `key` field in an urlencoded body.
pub fn form_value(body: &str, key: &str) -> Option<String> {
    body.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        (decode_component(name) == key).then(|| decode_component(value))
    })
}

/// Decode `+` as space and `%XX` escapes. Malformed escapes pass through.
pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_and_percent_escapes() {
        assert_eq!(decode_component("farm+laws%3A+2020"), "farm laws: 2020");
    }

    #[test]
    fn multibyte_utf8() {
        assert_eq!(decode_component("%E0%A4%AD%E0%A4%BE%E0%A4%B0%E0%A4%A4"), "भारत");
    }

    #[test]
    fn malformed_escape_passes_through() {
        assert_eq!(decode_component("100%+sure%zz%4"), "100% sure%zz%4");
    }

    #[test]
    fn signed_hex_is_not_an_escape() {
        assert_eq!(decode_component("%+1%-f"), "% 1%-f");
        assert_eq!(decode_component("%2B"), "+");
    }

    #[test]
    fn finds_field_among_others() {
        let body = "lang=en&topic=monsoon+session&topic=ignored";
        assert_eq!(form_value(body, "topic").as_deref(), Some("monsoon session"));
        assert_eq!(form_value(body, "missing"), None);
        assert_eq!(form_value("topic", "topic").as_deref(), Some(""));
    }
}

use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode, NON_ALPHANUMERIC};

// RFC 3986 unreserved characters are left as-is
const NOT_ENCODED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

// object keys keep their `/` separators
const KEY_NOT_ENCODED: &AsciiSet = &NOT_ENCODED.remove(b'/');

pub(crate) fn urlencode(input: &str) -> PercentEncode<'_> {
    utf8_percent_encode(input, NOT_ENCODED)
}

/// Encode an object key for use as a request path, relative to the bucket URL.
pub(crate) fn object_path(key: &str) -> String {
    let key = key.trim_start_matches('/');
    format!("/{}", utf8_percent_encode(key, KEY_NOT_ENCODED))
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! urlencode_tests {
        ($($name:ident: $input:expr, $output:expr,)*) => {
        $(
            #[test]
            fn $name() {
                assert_eq!(&urlencode($input).to_string(), $output);
            }
        )*
        }
    }

    urlencode_tests! {
        unencoded: "abc-ABC_123.tilde~..", "abc-ABC_123.tilde~..",
        slashes: "abc/def", "abc%2Fdef",
        spaces: "abc def", "abc%20def",
        control: "abc\ndef", "abc%0Adef",
        equals_amp: "a=b&c", "a%3Db%26c",
    }

    macro_rules! object_path_tests {
        ($($name:ident: $input:expr, $output:expr,)*) => {
        $(
            #[test]
            fn $name() {
                assert_eq!(&object_path($input), $output);
            }
        )*
        }
    }

    object_path_tests! {
        key_simple: "test.txt", "/test.txt",
        key_nested: "a/b/c.txt", "/a/b/c.txt",
        key_leading_slash: "/a/b", "/a/b",
        key_spaces: "my file.txt", "/my%20file.txt",
        key_query_chars: "x?y#z", "/x%3Fy%23z",
        key_unicode: "中文.txt", "/%E4%B8%AD%E6%96%87.txt",
    }
}

/// Parse all `{{var}}` spans in `input`.
/// Returns a list of `(start_byte, end_byte, var_name)` where start/end are byte
/// offsets in the original string (inclusive of the `{{` and `}}` delimiters).
/// The name is the exact inner text — no whitespace trimming, so `{{ host }}`
/// only matches a variable literally keyed `" host "`. Empty names and
/// unclosed braces are skipped.
pub fn parse_vars(input: &str) -> Vec<(usize, usize, String)> {
    let mut result = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i + 1 < len {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            let start = i;
            let inner_start = i + 2;
            // Search for closing '}}'
            let mut j = inner_start;
            let mut found = false;
            while j + 1 < len {
                if bytes[j] == b'}' && bytes[j + 1] == b'}' {
                    found = true;
                    break;
                }
                j += 1;
            }
            if found {
                let name = &input[inner_start..j];
                if !name.is_empty() {
                    result.push((start, j + 2, name.to_string()));
                }
                i = j + 2;
            } else {
                // Unclosed — skip
                break;
            }
        } else {
            i += 1;
        }
    }

    result
}

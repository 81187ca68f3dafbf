//! HTML entity decoding.
//!
//! The provider HTML-escapes every string it returns (`&quot;`, `&#039;`,
//! accented letters by name). Prompts are shown as plain text, so names,
//! questions and answers are decoded once on the way in.

/// Named entities the provider is known to emit.
const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("shy", '\u{ad}'),
    ("deg", '°'),
    ("pi", 'π'),
    ("hellip", '…'),
    ("ndash", '–'),
    ("mdash", '—'),
    ("lsquo", '‘'),
    ("rsquo", '’'),
    ("ldquo", '“'),
    ("rdquo", '”'),
    ("laquo", '«'),
    ("raquo", '»'),
    ("eacute", 'é'),
    ("Eacute", 'É'),
    ("egrave", 'è'),
    ("ecirc", 'ê'),
    ("euml", 'ë'),
    ("aacute", 'á'),
    ("Aacute", 'Á'),
    ("agrave", 'à'),
    ("acirc", 'â'),
    ("auml", 'ä'),
    ("Auml", 'Ä'),
    ("aring", 'å'),
    ("Aring", 'Å'),
    ("aelig", 'æ'),
    ("ccedil", 'ç'),
    ("iacute", 'í'),
    ("icirc", 'î'),
    ("iuml", 'ï'),
    ("ntilde", 'ñ'),
    ("oacute", 'ó'),
    ("Oacute", 'Ó'),
    ("ocirc", 'ô'),
    ("ouml", 'ö'),
    ("Ouml", 'Ö'),
    ("oslash", 'ø'),
    ("Oslash", 'Ø'),
    ("uacute", 'ú'),
    ("ucirc", 'û'),
    ("uuml", 'ü'),
    ("Uuml", 'Ü'),
    ("szlig", 'ß'),
    ("eth", 'ð'),
    ("thorn", 'þ'),
    ("yacute", 'ý'),
    ("micro", 'µ'),
    ("sup2", '²'),
    ("sup3", '³'),
    ("times", '×'),
    ("divide", '÷'),
    ("trade", '™'),
    ("copy", '©'),
    ("reg", '®'),
    ("euro", '€'),
    ("pound", '£'),
];

/// Longest entity body worth scanning for, `#x10FFFF` included.
const MAX_ENTITY_LEN: usize = 10;

fn resolve(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }
    NAMED
        .iter()
        .find(|(name, _)| *name == entity)
        .map(|(_, c)| *c)
}

/// Replaces HTML entities with the characters they stand for. Unknown or
/// malformed entities are left as written.
#[must_use]
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let decoded = tail
            .find(';')
            .filter(|end| *end > 0 && *end <= MAX_ENTITY_LEN)
            .and_then(|end| resolve(&tail[..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_quotes_and_apostrophes() {
        assert_eq!(
            decode_entities("Which &quot;Star Wars&quot; film isn&#039;t a prequel?"),
            "Which \"Star Wars\" film isn't a prequel?"
        );
    }

    #[test]
    fn test_decodes_named_accents_and_hex() {
        assert_eq!(decode_entities("Pok&eacute;mon &amp; Caf&#xE9;"), "Pokémon & Café");
    }

    #[test]
    fn test_leaves_unknown_and_bare_ampersands() {
        assert_eq!(decode_entities("AT&T &bogus; a & b"), "AT&T &bogus; a & b");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn test_does_not_decode_twice() {
        assert_eq!(decode_entities("&amp;quot;"), "&quot;");
    }

    #[test]
    fn test_invalid_code_point_is_kept() {
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    }
}

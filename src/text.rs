//! Slugs and resource file names.

use url::Url;

/// Lowercase, ASCII-only, hyphen-separated token suitable for a catalog name.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;
    for ch in value.chars().flat_map(fold_char) {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

// Latin letters with diacritics that show up in country names.
fn fold_char(ch: char) -> impl Iterator<Item = char> {
    let folded: &'static [char] = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => &['a'],
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => &['A'],
        'æ' => &['a', 'e'],
        'Æ' => &['A', 'E'],
        'ç' => &['c'],
        'Ç' => &['C'],
        'è' | 'é' | 'ê' | 'ë' => &['e'],
        'È' | 'É' | 'Ê' | 'Ë' => &['E'],
        'ì' | 'í' | 'î' | 'ï' => &['i'],
        'Ì' | 'Í' | 'Î' | 'Ï' => &['I'],
        'ñ' => &['n'],
        'Ñ' => &['N'],
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => &['o'],
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => &['O'],
        'ù' | 'ú' | 'û' | 'ü' => &['u'],
        'Ù' | 'Ú' | 'Û' | 'Ü' => &['U'],
        'ý' | 'ÿ' => &['y'],
        'Ý' => &['Y'],
        'ß' => &['s', 's'],
        _ => return FoldIter::Single(Some(ch)),
    };
    FoldIter::Many(folded.iter())
}

enum FoldIter {
    Single(Option<char>),
    Many(std::slice::Iter<'static, char>),
}

impl Iterator for FoldIter {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        match self {
            Self::Single(ch) => ch.take(),
            Self::Many(chars) => chars.next().copied(),
        }
    }
}

/// Final path segment of `url`, without query or fragment.
pub fn filename_from_url(url: &str) -> Option<String> {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or_default();
            path.rsplit('/').next().map(str::to_string)
        }
    };
    segment.filter(|name| !name.is_empty())
}

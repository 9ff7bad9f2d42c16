//! Language driver to code page mapping.

/// Code page assumed when the language driver byte is zero or unknown.
pub const DEFAULT_CODE_PAGE: u32 = 866;

/// Language driver byte to code page, sorted by driver.
static CODE_PAGES: &[(u8, u32)] = &[
    (1, 437),
    (2, 850),
    (3, 1252),
    (4, 10000),
    (8, 865),
    (9, 437),
    (10, 850),
    (11, 437),
    (13, 437),
    (14, 850),
    (15, 437),
    (16, 850),
    (17, 437),
    (18, 850),
    (19, 932),
    (20, 850),
    (21, 850),
    (22, 437),
    (23, 850),
    (24, 437),
    (25, 437),
    (26, 850),
    (27, 437),
    (28, 863),
    (29, 850),
    (31, 852),
    (34, 852),
    (35, 852),
    (36, 860),
    (37, 850),
    (38, 866),
    (55, 850),
    (64, 852),
    (77, 936),
    (78, 949),
    (79, 950),
    (80, 874),
    (88, 1252),
    (89, 1252),
    (100, 852),
    (101, 866),
    (102, 865),
    (103, 861),
    (104, 895),
    (105, 866),
    (106, 737),
    (107, 857),
    (108, 863),
    (120, 950),
    (121, 949),
    (122, 936),
    (123, 932),
    (124, 874),
    (134, 737),
    (135, 852),
    (136, 857),
    (150, 10007),
    (151, 10029),
    (152, 10006),
    (200, 1250),
    (201, 1251),
    (202, 1254),
    (203, 1253),
    (204, 1257),
];

/// Looks up the code page for a non-zero language driver byte.
pub fn lookup(driver: u8) -> Option<u32> {
    CODE_PAGES
        .binary_search_by_key(&driver, |&(d, _)| d)
        .ok()
        .map(|i| CODE_PAGES[i].1)
}

/// Resolves the code page of a table.
///
/// Driver `0` and drivers missing from the table fall back to `fallback`,
/// or to [`DEFAULT_CODE_PAGE`] when no fallback is configured.
pub fn resolve(driver: u8, fallback: Option<u32>) -> u32 {
    let fallback = fallback.unwrap_or(DEFAULT_CODE_PAGE);
    if driver == 0 {
        return fallback;
    }
    lookup(driver).unwrap_or(fallback)
}

/// Formats a code page as its conventional name, e.g. `cp1251`.
pub fn name(code_page: u32) -> String {
    format!("cp{}", code_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(CODE_PAGES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_lookup_known_drivers() {
        assert_eq!(lookup(1), Some(437));
        assert_eq!(lookup(38), Some(866));
        assert_eq!(lookup(201), Some(1251));
        assert_eq!(lookup(204), Some(1257));
    }

    #[test]
    fn test_lookup_unknown_driver() {
        assert_eq!(lookup(0), None);
        assert_eq!(lookup(5), None);
        assert_eq!(lookup(255), None);
    }

    #[test]
    fn test_resolve_default_and_override() {
        assert_eq!(resolve(0, None), 866);
        assert_eq!(resolve(0, Some(1251)), 1251);
        assert_eq!(resolve(3, Some(1251)), 1252);
        assert_eq!(resolve(99, Some(437)), 437);
        assert_eq!(resolve(99, None), DEFAULT_CODE_PAGE);
    }

    #[test]
    fn test_name() {
        assert_eq!(name(866), "cp866");
        assert_eq!(name(10007), "cp10007");
    }
}

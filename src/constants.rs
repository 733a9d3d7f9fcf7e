use crate::types::Mode;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 16;

/// Upper bound on rows fetched from the gateway per mode.
pub const MAX_FETCH_ROWS: usize = 20;
pub const DEFAULT_TOP_LIMIT: usize = 10;

pub const DEFAULT_MODE: Mode = Mode::Skeleton;

/// Accented letters accepted in player names besides ASCII.
pub const EXTRA_NAME_CHARS: &[char] = &['å', 'ä', 'ö', 'Å', 'Ä', 'Ö'];

pub const STORE_FILE_VERSION: u8 = 1;

pub fn normalize_top_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_TOP_LIMIT)
        .clamp(1, DEFAULT_TOP_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_limit_is_clamped_to_default_board_size() {
        assert_eq!(normalize_top_limit(None), 10);
        assert_eq!(normalize_top_limit(Some(0)), 1);
        assert_eq!(normalize_top_limit(Some(5)), 5);
        assert_eq!(normalize_top_limit(Some(999)), 10);
    }
}

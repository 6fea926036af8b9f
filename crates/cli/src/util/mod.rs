use owo_colors::{OwoColorize, Stream};
use titlebar_core::types::PhysicalRect;

pub type CliResult<T> = anyhow::Result<T>;

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Comma separated rectangle list, `-` when empty.
pub fn format_rects(rects: &[PhysicalRect]) -> String {
    if rects.is_empty() {
        return "-".to_owned();
    }
    rects.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

pub(crate) fn paint_ok(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.fg_rgb::<136, 192, 74>().to_string()).to_string()
}

pub(crate) fn paint_skip(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.fg_rgb::<241, 196, 15>().to_string()).to_string()
}

pub(crate) fn paint_error(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.bold().fg_rgb::<255, 85, 85>().to_string()).to_string()
}

pub(crate) fn paint_label(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.dimmed().to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_rects_joins_or_dashes() {
        assert_eq!(format_rects(&[]), "-");
        assert_eq!(
            format_rects(&[PhysicalRect::new(1, 2, 3, 4), PhysicalRect::new(5, 6, 7, 8)]),
            "(1, 2, 3x4), (5, 6, 7x8)"
        );
    }
}

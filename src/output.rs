use crate::error::CliError;
use serde::Serialize;

pub struct Styler {
    color_enabled: bool,
}

impl Styler {
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    fn wrap(&self, code: &str, s: &str) -> String {
        if !self.color_enabled {
            return s.to_string();
        }
        format!("{}{}\u{001b}[0m", code, s)
    }

    pub fn green(&self, s: &str) -> String {
        self.wrap("\u{001b}[32m", s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.wrap("\u{001b}[33m", s)
    }

    pub fn gray(&self, s: &str) -> String {
        self.wrap("\u{001b}[90m", s)
    }

    /// Green once the goal is met, yellow while under way, gray at zero.
    pub fn percent(&self, percent: u32, s: &str) -> String {
        match percent {
            0 => self.gray(s),
            p if p >= 100 => self.green(s),
            _ => self.yellow(s),
        }
    }
}

/// Code point ranges rendered two columns wide: CJK, Hangul, fullwidth
/// forms, common emoji and the block elements used by progress bars.
const WIDE_RANGES: &[(u32, u32)] = &[
    (0x2580, 0x259F),
    (0x2600, 0x27BF),
    (0x3400, 0x4DBF),
    (0x4E00, 0x9FFF),
    (0xAC00, 0xD7AF),
    (0xF900, 0xFAFF),
    (0xFF00, 0xFFEF),
    (0x1F300, 0x1F9FF),
    (0x20000, 0x2A6DF),
];

fn char_width(c: char) -> usize {
    let cp = c as u32;
    if WIDE_RANGES.iter().any(|(lo, hi)| (*lo..=*hi).contains(&cp)) {
        2
    } else {
        1
    }
}

/// Terminal column count of `s`; deterministic, never probes the terminal.
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

fn pad_right(s: &str, width: usize) -> String {
    let dw = display_width(s);
    if dw >= width {
        return s.to_string();
    }
    format!("{}{}", s, " ".repeat(width - dw))
}

pub fn render_simple_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let w = display_width(cell);
            match widths.get_mut(i) {
                Some(cur) => *cur = (*cur).max(w),
                None => widths.push(w),
            }
        }
    }

    let mut lines = vec![render_line(headers, &widths)];
    for row in rows {
        lines.push(render_line(row, &widths));
    }
    lines.join("\n")
}

fn render_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, w)| pad_right(c.as_ref(), *w))
        .collect::<Vec<String>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn render_progress_bar(percent: u32, width: usize) -> String {
    let filled = ((percent.min(100) as f64 / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(width - filled))
}

/// `45m`, `2h`, `1h 30m`.
pub fn format_minutes(minutes: u32) -> String {
    let h = minutes / 60;
    let m = minutes % 60;
    match (h, m) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Pretty JSON with object keys sorted, so output is stable across runs.
pub fn stable_to_string_pretty<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    // serde_json's Map is ordered by key unless `preserve_order` is enabled.
    let v = serde_json::to_value(value)?;
    serde_json::to_string_pretty(&v)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let s = stable_to_string_pretty(value).map_err(|_| CliError::io("JSON encode error"))?;
    println!("{}", s);
    Ok(())
}

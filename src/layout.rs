extern crate std;

use crate::arrivals;

/// The display is a fixed 16x2 character matrix. Every line handed to the
/// screen must be exactly this wide.
pub const LINE_WIDTH: usize = 16;

// "QUEENS" already fits the 6-char static label field; only the south
// direction needs an abbreviation there.
const NORTH_LABEL: &str = "QUEENS";
const SOUTH_LABEL: &str = "BROOKLYN";
const SOUTH_LABEL_SHORT: &str = "BRKLYN";

pub fn blank_line() -> String {
    return " ".repeat(LINE_WIDTH);
}

/// Label left-aligned, suffix right-aligned, spaces in between.
fn justify(label: &str, suffix: &str) -> String {
    let spacer = LINE_WIDTH.saturating_sub(label.len() + suffix.len());
    return format!("{}{}{}", label, " ".repeat(spacer), suffix);
}

fn pad_line(line: &str) -> String {
    return format!("{:<width$}", line, width = LINE_WIDTH);
}

/// Single-screen summary: one line per direction, three 2-char minute
/// cells after a 6-char label. "--" marks an empty slot.
pub fn static_screen(northbound: &[arrivals::ArrivalRecord],
                     southbound: &[arrivals::ArrivalRecord]) -> (String, String) {
    return (static_line(NORTH_LABEL, northbound),
            static_line(SOUTH_LABEL_SHORT, southbound));
}

fn static_line(label: &str, arrivals: &[arrivals::ArrivalRecord]) -> String {
    let mut line = format!("{:<6}", label);
    for slot in 0..3 {
        let cell = match arrivals.get(slot) {
            Some(record) => minutes_cell(record.minutes_until),
            None => "--".to_string(),
        };
        line.push(' ');
        line.push_str(&cell);
    }
    return pad_line(&line);
}

fn minutes_cell(minutes: i64) -> String {
    if minutes >= 99 {
        // Clamps; a real 99-minute wait looks the same.
        return "99".to_string();
    }
    return format!("{:02}", minutes);
}

/// The four-page cycle: two northbound trains, the third northbound train,
/// two southbound trains, the third southbound train. Single-train pages
/// get an all-space second line.
pub fn dynamic_pages(northbound: &[arrivals::ArrivalRecord],
                     southbound: &[arrivals::ArrivalRecord]) -> Vec<(String, String)> {
    return vec![
        (train_line(NORTH_LABEL, northbound.get(0)),
         train_line(NORTH_LABEL, northbound.get(1))),
        (train_line(NORTH_LABEL, northbound.get(2)),
         blank_line()),
        (train_line(SOUTH_LABEL, southbound.get(0)),
         train_line(SOUTH_LABEL, southbound.get(1))),
        (train_line(SOUTH_LABEL, southbound.get(2)),
         blank_line()),
    ];
}

fn train_line(label: &str, record: Option<&arrivals::ArrivalRecord>) -> String {
    let suffix = match record {
        Some(record) => time_suffix(record.minutes_until),
        None => "NA".to_string(),
    };
    return justify(label, &suffix);
}

fn time_suffix(minutes: i64) -> String {
    if minutes < 100 {
        return format!("{:2} M", minutes);
    }
    return "99+M".to_string();
}

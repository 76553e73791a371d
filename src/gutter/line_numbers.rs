//! Line number lane

use tracing::debug;

use super::VisibleLine;

/// One right-aligned line number
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LineNumberCell {
    pub line: usize,
    pub label: String,
    /// Left edge of the label, relative to the lane
    pub x: f32,
    pub y: f32,
    /// Caret line, painted in the active color
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct LineNumberLane {
    /// Number shown for line 0
    start: usize,
    char_width: f32,
    /// Space on each side of the numbers
    padding: f32,
    digits: usize,
    width: f32,
}

impl LineNumberLane {
    pub fn new(start: usize, char_width: f32, padding: f32) -> Self {
        let digits = digit_count(start);
        Self {
            start,
            char_width,
            padding,
            digits,
            width: lane_width(digits, char_width, padding),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn digits(&self) -> usize {
        self.digits
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn set_start(&mut self, start: usize, line_count: usize) -> bool {
        self.start = start;
        self.update_width(line_count)
    }

    /// Recompute the lane width if the highest line number gained or lost a
    /// digit. Returns whether the width changed.
    pub fn update_width(&mut self, line_count: usize) -> bool {
        let highest = line_count.saturating_sub(1) + self.start;
        let digits = digit_count(highest);
        if digits == self.digits {
            return false;
        }
        debug!(from = self.digits, to = digits, "line number lane width changed");
        self.digits = digits;
        self.width = lane_width(digits, self.char_width, self.padding);
        true
    }

    pub fn label(&self, line: usize) -> String {
        (line + self.start).to_string()
    }

    pub fn paint(&self, lines: &[VisibleLine], caret_line: usize) -> Vec<LineNumberCell> {
        lines
            .iter()
            .map(|visible| {
                let label = self.label(visible.line);
                let text_width = label.len() as f32 * self.char_width;
                LineNumberCell {
                    line: visible.line,
                    x: self.width - self.padding - text_width,
                    y: visible.y,
                    active: visible.line == caret_line,
                    label,
                }
            })
            .collect()
    }
}

fn digit_count(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

fn lane_width(digits: usize, char_width: f32, padding: f32) -> f32 {
    digits as f32 * char_width + 2.0 * padding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(1000), 4);
    }

    #[test]
    fn test_width_changes_only_across_power_of_ten() {
        let mut lane = LineNumberLane::new(1, 8.0, 4.0);
        assert!(!lane.update_width(5));
        assert!(!lane.update_width(9));
        // Line numbers now reach 10
        assert!(lane.update_width(10));
        assert_eq!(lane.width(), 2.0 * 8.0 + 8.0);
        assert!(!lane.update_width(50));
        assert!(!lane.update_width(99));
        assert!(lane.update_width(100));
        assert!(lane.update_width(20));
        assert_eq!(lane.digits(), 2);
    }

    #[test]
    fn test_labels_honor_start() {
        let mut lane = LineNumberLane::new(0, 8.0, 4.0);
        assert_eq!(lane.label(0), "0");
        lane.set_start(100, 5);
        assert_eq!(lane.label(0), "100");
        assert_eq!(lane.digits(), 3);
    }

    #[test]
    fn test_paint_right_aligns_and_flags_caret_line() {
        let mut lane = LineNumberLane::new(1, 8.0, 4.0);
        lane.update_width(20);
        let lines = [
            VisibleLine {
                line: 8,
                y: 0.0,
                height: 10.0,
            },
            VisibleLine {
                line: 9,
                y: 10.0,
                height: 10.0,
            },
        ];
        let cells = lane.paint(&lines, 9);
        assert_eq!(cells[0].label, "9");
        assert_eq!(cells[0].x, 12.0);
        assert_eq!(cells[1].label, "10");
        assert_eq!(cells[1].x, 4.0);
        assert!(!cells[0].active);
        assert!(cells[1].active);
    }
}

//! Typed tokenizer for SVG path data (`d` attribute) strings.
//!
//! Produces one [`PathCommand`] per drawing operation, expanding implicit
//! repeats (`L 1 1 2 2` is two line commands, extra pairs after a move are
//! implicit lines). Number parsing follows the path grammar, so exponents
//! such as `1e-5` and packed forms such as `.5.5` or `1-2` are read as
//! numbers and never confused with command letters.
//!
//! Malformed input never fails: characters that cannot start a command or
//! a number are skipped, and a parameter group cut short is dropped. Both
//! are tallied in [`PathData::skipped`].

/// Kind of a path command, independent of absolute/relative form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `M` / `m`
    MoveTo,
    /// `L` / `l`
    LineTo,
    /// `H` / `h`
    HorizontalLineTo,
    /// `V` / `v`
    VerticalLineTo,
    /// `C` / `c`
    CurveTo,
    /// `S` / `s`
    SmoothCurveTo,
    /// `Q` / `q`
    QuadraticCurveTo,
    /// `T` / `t`
    SmoothQuadraticCurveTo,
    /// `A` / `a`
    EllipticalArc,
    /// `Z` / `z`
    ClosePath,
}

impl CommandKind {
    /// Parse a command letter into its kind and whether it is relative.
    #[must_use]
    pub const fn from_letter(letter: u8) -> Option<(Self, bool)> {
        let kind = match letter.to_ascii_uppercase() {
            b'M' => Self::MoveTo,
            b'L' => Self::LineTo,
            b'H' => Self::HorizontalLineTo,
            b'V' => Self::VerticalLineTo,
            b'C' => Self::CurveTo,
            b'S' => Self::SmoothCurveTo,
            b'Q' => Self::QuadraticCurveTo,
            b'T' => Self::SmoothQuadraticCurveTo,
            b'A' => Self::EllipticalArc,
            b'Z' => Self::ClosePath,
            _ => return None,
        };
        Some((kind, letter.is_ascii_lowercase()))
    }

    /// Number of parameters one instance of the command takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::ClosePath => 0,
            Self::HorizontalLineTo | Self::VerticalLineTo => 1,
            Self::MoveTo | Self::LineTo | Self::SmoothQuadraticCurveTo => 2,
            Self::SmoothCurveTo | Self::QuadraticCurveTo => 4,
            Self::CurveTo => 6,
            Self::EllipticalArc => 7,
        }
    }

    /// Whether the command counts as a drawing segment of a chain.
    ///
    /// Only horizontal, vertical, straight and cubic segments do; moves,
    /// closes and the remaining curve forms do not.
    #[must_use]
    pub const fn is_segment(self) -> bool {
        matches!(
            self,
            Self::LineTo | Self::HorizontalLineTo | Self::VerticalLineTo | Self::CurveTo
        )
    }
}

/// One decoded path command with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    /// What the command does.
    pub kind: CommandKind,
    /// Lowercase (relative) form.
    pub relative: bool,
    /// Produced by a repeated parameter group rather than an explicit letter.
    pub implicit: bool,
    /// Parameters; arc flags are stored as `0.0` / `1.0`.
    pub args: Vec<f64>,
}

/// Tokenized path data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathData {
    /// Decoded commands in source order.
    pub commands: Vec<PathCommand>,
    /// Unrecognized characters, stray numbers and truncated parameter
    /// groups that were dropped.
    pub skipped: usize,
}

impl PathData {
    /// Number of drawing segments (see [`CommandKind::is_segment`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use strokecmp_metrics::path_data::tokenize;
    ///
    /// assert_eq!(tokenize("M0 0H10V10L5 5").segment_count(), 3);
    /// assert_eq!(tokenize("M0 0").segment_count(), 0);
    /// ```
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.commands.iter().filter(|c| c.kind.is_segment()).count()
    }
}

/// Tokenize a path data string.
#[must_use]
pub fn tokenize(data: &str) -> PathData {
    let mut lexer = Lexer::new(data);
    let mut out = PathData::default();
    // Active command and whether its next group is an implicit repeat.
    let mut current: Option<(CommandKind, bool, bool)> = None;

    loop {
        lexer.skip_separators();
        if lexer.at_end() {
            break;
        }

        if let Some((kind, relative)) = lexer.command() {
            if kind == CommandKind::ClosePath {
                out.commands.push(PathCommand {
                    kind,
                    relative,
                    implicit: false,
                    args: Vec::new(),
                });
                current = None;
            } else {
                current = Some((kind, relative, false));
            }
            continue;
        }

        match current {
            Some((kind, relative, implicit)) if lexer.starts_number() => {
                if let Some(args) = lexer.arguments(kind) {
                    // Extra coordinate pairs after a move are implicit lines.
                    let emitted = if implicit && kind == CommandKind::MoveTo {
                        CommandKind::LineTo
                    } else {
                        kind
                    };
                    out.commands.push(PathCommand {
                        kind: emitted,
                        relative,
                        implicit,
                        args,
                    });
                    current = Some((kind, relative, true));
                } else {
                    // Truncated group: drop it and resync on whatever
                    // stopped it.
                    out.skipped += 1;
                    current = None;
                }
            }
            _ => {
                out.skipped += 1;
                lexer.skip_token();
            }
        }
    }

    if out.skipped > 0 {
        tracing::warn!(
            skipped = out.skipped,
            data,
            "ignored unrecognized path data"
        );
    }

    out
}

/// Byte cursor over path data.
struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_separators(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn starts_number(&self) -> bool {
        self.peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-'))
    }

    fn command(&mut self) -> Option<(CommandKind, bool)> {
        let parsed = CommandKind::from_letter(self.peek()?)?;
        self.pos += 1;
        Some(parsed)
    }

    /// Read one full parameter group for `kind`.
    ///
    /// On failure the cursor is left at the offending byte.
    fn arguments(&mut self, kind: CommandKind) -> Option<Vec<f64>> {
        let mut args = Vec::with_capacity(kind.arity());
        for idx in 0..kind.arity() {
            self.skip_separators();
            let is_flag = kind == CommandKind::EllipticalArc && (idx == 3 || idx == 4);
            let value = if is_flag { self.flag()? } else { self.number()? };
            args.push(value);
        }
        Some(args)
    }

    /// Arc flags are a single `0` or `1` and may be packed without separators.
    fn flag(&mut self) -> Option<f64> {
        let value = match self.peek()? {
            b'0' => 0.0,
            b'1' => 1.0,
            _ => return None,
        };
        self.pos += 1;
        Some(value)
    }

    /// `sign? (digits ('.' digits?)? | '.' digits) (('e'|'E') sign? digits)?`
    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut end = start;
        let at = |i: usize| self.src.get(i).copied();

        if matches!(at(end), Some(b'+' | b'-')) {
            end += 1;
        }
        let int_start = end;
        while at(end).is_some_and(|b| b.is_ascii_digit()) {
            end += 1;
        }
        let mut mantissa_digits = end - int_start;
        if at(end) == Some(b'.') {
            let frac_start = end + 1;
            let mut frac_end = frac_start;
            while at(frac_end).is_some_and(|b| b.is_ascii_digit()) {
                frac_end += 1;
            }
            if mantissa_digits > 0 || frac_end > frac_start {
                mantissa_digits += frac_end - frac_start;
                end = frac_end;
            }
        }
        if mantissa_digits == 0 {
            return None;
        }
        // Only consume an exponent that actually has digits.
        if matches!(at(end), Some(b'e' | b'E')) {
            let mut exp_end = end + 1;
            if matches!(at(exp_end), Some(b'+' | b'-')) {
                exp_end += 1;
            }
            let digits_start = exp_end;
            while at(exp_end).is_some_and(|b| b.is_ascii_digit()) {
                exp_end += 1;
            }
            if exp_end > digits_start {
                end = exp_end;
            }
        }

        let text = std::str::from_utf8(&self.src[start..end]).ok()?;
        let value = text.parse::<f64>().ok()?;
        self.pos = end;
        Some(value)
    }

    /// Discard a stray number, or a single byte when no number starts here.
    fn skip_token(&mut self) {
        if self.number().is_none() {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn kinds(data: &str) -> Vec<CommandKind> {
        tokenize(data).commands.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn basic_segments_are_typed() {
        use CommandKind::{HorizontalLineTo, LineTo, MoveTo, VerticalLineTo};
        assert_eq!(
            kinds("M0 0H10V10L5 5"),
            vec![MoveTo, HorizontalLineTo, VerticalLineTo, LineTo]
        );
    }

    #[test]
    fn move_alone_has_no_segments() {
        let path = tokenize("M0 0");
        assert_eq!(path.commands.len(), 1);
        assert_eq!(path.segment_count(), 0);
        assert_eq!(path.skipped, 0);
    }

    #[test]
    fn empty_string_has_no_commands() {
        let path = tokenize("");
        assert!(path.commands.is_empty());
        assert_eq!(path.skipped, 0);
    }

    #[test]
    fn exponents_are_not_command_letters() {
        let path = tokenize("M1e-5 2E+3 L1.5e2,-3e1");
        assert_eq!(path.segment_count(), 1);
        assert_eq!(path.skipped, 0);
        assert!((path.commands[0].args[0] - 1e-5).abs() < 1e-12);
        assert!((path.commands[0].args[1] - 2000.0).abs() < 1e-9);
        assert!((path.commands[1].args[0] - 150.0).abs() < 1e-9);
    }

    #[test]
    fn packed_numbers_split_correctly() {
        let path = tokenize("M.5.5L1-2");
        assert_eq!(path.commands[0].args, vec![0.5, 0.5]);
        assert_eq!(path.commands[1].args, vec![1.0, -2.0]);
    }

    #[test]
    fn implicit_repeats_count_as_segments() {
        let path = tokenize("M0 0 L1 1 2 2 3 3");
        assert_eq!(path.segment_count(), 3);
        assert!(!path.commands[1].implicit);
        assert!(path.commands[2].implicit);
    }

    #[test]
    fn extra_move_pairs_become_lines() {
        let path = tokenize("m0 0 10 10 20 20");
        assert_eq!(
            kinds("m0 0 10 10 20 20"),
            vec![CommandKind::MoveTo, CommandKind::LineTo, CommandKind::LineTo]
        );
        assert!(path.commands.iter().all(|c| c.relative));
        assert_eq!(path.segment_count(), 2);
    }

    #[test]
    fn relative_forms_count_like_absolute() {
        assert_eq!(tokenize("m0 0h5v5l1 1c1 1 2 2 3 3").segment_count(), 4);
    }

    #[test]
    fn other_curves_and_close_are_not_segments() {
        let path = tokenize("M0 0 Q1 1 2 2 T3 3 S1 1 2 2 A5 5 0 0 1 9 9 Z");
        assert_eq!(path.commands.len(), 6);
        assert_eq!(path.segment_count(), 0);
        assert_eq!(path.skipped, 0);
    }

    #[test]
    fn packed_arc_flags_parse() {
        let path = tokenize("M0 0a5 5 0 11 10 0");
        let arc = &path.commands[1];
        assert_eq!(arc.kind, CommandKind::EllipticalArc);
        assert_eq!(arc.args, vec![5.0, 5.0, 0.0, 1.0, 1.0, 10.0, 0.0]);
    }

    #[test]
    fn cubic_takes_six_parameters() {
        let path = tokenize("M0 0 C1 2 3 4 5 6 7 8 9 10 11 12");
        assert_eq!(path.segment_count(), 2);
        assert_eq!(path.commands[2].args.len(), 6);
    }

    #[test]
    fn unrecognized_characters_are_skipped() {
        let path = tokenize("M0 0 X L1 1 # H4");
        assert_eq!(path.segment_count(), 2);
        assert_eq!(path.skipped, 2);
    }

    #[test]
    fn stray_character_does_not_end_implicit_repeats() {
        let path = tokenize("M0 0 L1 1 ; 2 2");
        assert_eq!(path.segment_count(), 2);
        assert_eq!(path.skipped, 1);
    }

    #[test]
    fn truncated_group_is_dropped() {
        let path = tokenize("M0 0 L1");
        assert_eq!(path.segment_count(), 0);
        assert_eq!(path.skipped, 1);
        assert_eq!(path.commands.len(), 1);

        let path = tokenize("M0 0 C1 1 2 2 H3");
        // The curve is cut short by H; the H still counts.
        assert_eq!(path.segment_count(), 1);
        assert_eq!(path.commands[1].kind, CommandKind::HorizontalLineTo);
    }

    #[test]
    fn numbers_before_any_command_are_skipped() {
        let path = tokenize("1 2 M0 0 L1 1");
        assert_eq!(path.segment_count(), 1);
        assert_eq!(path.skipped, 2);
    }

    #[test]
    fn numbers_after_close_are_skipped() {
        let path = tokenize("M0 0 L1 1 Z 4 5");
        assert_eq!(path.segment_count(), 1);
        assert_eq!(path.skipped, 2);
    }

    #[test]
    fn dangling_exponent_marker_is_not_consumed() {
        // "1e" is the number 1 followed by a stray 'e'.
        let path = tokenize("M1e 2");
        assert_eq!(path.commands.len(), 0);
        assert!(path.skipped > 0);

        let path = tokenize("M1 2e");
        assert_eq!(path.commands[0].args, vec![1.0, 2.0]);
        assert_eq!(path.skipped, 1);
    }

    #[test]
    fn non_ascii_input_does_not_panic() {
        let path = tokenize("M0 0 L1 1 \u{00e9}\u{2014} V3");
        assert_eq!(path.segment_count(), 2);
        assert!(path.skipped > 0);
    }
}

/// Standard PDF fonts used when no font faces are configured. They need no
/// embedding and are written with WinAnsiEncoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

/// Helvetica widths for ASCII 32..=126 in 1/1000 em (Adobe AFM).
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

/// Helvetica-Bold widths for ASCII 32..=126 in 1/1000 em (Adobe AFM).
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Width for WinAnsi codes outside the printable ASCII range.
const DEFAULT_WIDTH: u16 = 556;

impl BuiltinFont {
    pub fn base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn ascii_width(&self, b: u8) -> u16 {
        let table = match self {
            BuiltinFont::Helvetica => &HELVETICA_WIDTHS,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        table[(b - 32) as usize]
    }

    /// Width of one WinAnsi code in 1/1000 em.
    pub fn code_width(&self, code: u8) -> u16 {
        match code {
            32..=126 => self.ascii_width(code),
            0x8A => self.ascii_width(b'S'),
            0x9A => self.ascii_width(b's'),
            0x8E => self.ascii_width(b'Z'),
            0x9E => self.ascii_width(b'z'),
            0xD0 => self.ascii_width(b'D'),
            0xA0 => self.ascii_width(b' '),
            0xD7 => 584,
            0x97 => 1000,
            _ => DEFAULT_WIDTH,
        }
    }

    /// Text width in points.
    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        let total: u32 = text
            .chars()
            .map(|ch| self.code_width(win_ansi_code(ch)) as u32)
            .sum();
        total as f64 * font_size / 1000.0
    }

    pub fn line_height(&self, font_size: f64) -> f64 {
        font_size * 1.2
    }
}

/// Encode text as WinAnsi bytes for a builtin font.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_code).collect()
}

/// Map a character to its WinAnsiEncoding code. Croatian letters missing
/// from the encoding fall back to their base letter; anything else
/// unrepresentable becomes `?`.
pub fn win_ansi_code(ch: char) -> u8 {
    match ch {
        ' '..='~' => ch as u8,
        '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        'Š' => 0x8A,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        'š' => 0x9A,
        'ž' => 0x9E,
        'č' | 'ć' => b'c',
        'Č' | 'Ć' => b'C',
        'đ' => b'd',
        'Đ' => 0xD0,
        _ => b'?',
    }
}

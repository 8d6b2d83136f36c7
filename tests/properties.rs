//! Property tests for the parser and screen model

use proptest::prelude::*;
use vtscreen::core::{Line, Screen};
use vtscreen::Terminal;

/// Final bytes of the CSI sequences the performer handles
const CSI_FINALS: &[u8] = b"ABCDEFGHJKLMPSTXZ@`abdefghlmnrsu";

/// Bytes biased toward escape sequences and UTF-8 fragments
fn terminal_bytes() -> impl Strategy<Value = Vec<u8>> {
    let csi = (0u16..300, 0u16..300, prop::sample::select(CSI_FINALS.to_vec()))
        .prop_map(|(a, b, f)| format!("\x1b[{};{}{}", a, b, f as char).into_bytes());
    let private_mode = (
        prop::sample::select(vec![1u16, 6, 7, 25, 47, 1049, 2004]),
        any::<bool>(),
    )
        .prop_map(|(m, on)| format!("\x1b[?{}{}", m, if on { 'h' } else { 'l' }).into_bytes());
    let sgr = (0u16..256, 0u16..256)
        .prop_map(|(a, b)| format!("\x1b[38;5;{};48;2;{};1;2m", a, b).into_bytes());

    let token = prop_oneof![
        4 => any::<u8>().prop_map(|b| vec![b]),
        2 => "[ -~]{1,8}".prop_map(String::into_bytes),
        1 => "[\u{80}-\u{10FFFF}]{1,3}".prop_map(String::into_bytes),
        2 => "[中文字あいう가]{1,4}".prop_map(String::into_bytes),
        2 => csi,
        1 => private_mode,
        1 => sgr,
        1 => "[a-z ]{0,10}".prop_map(|s| format!("\x1b]2;{}\x07", s).into_bytes()),
        1 => prop::sample::select(vec![
            b"\r\n".to_vec(),
            b"\x1bM".to_vec(),
            b"\x1bD".to_vec(),
            b"\x1b7".to_vec(),
            b"\x1b8".to_vec(),
            b"\x1bc".to_vec(),
            b"\t".to_vec(),
            b"\x08".to_vec(),
        ]),
    ];
    prop::collection::vec(token, 0..64).prop_map(|tokens| tokens.concat())
}

/// Position of the first wide-character half that lost its partner
fn broken_wide_pair(line: &Line) -> Option<usize> {
    let cells = line.cells();
    cells.iter().enumerate().position(|(i, cell)| {
        let orphan_spacer = cell.is_wide_continuation() && (i == 0 || cells[i - 1].width != 2);
        let lone_head = cell.width == 2
            && !cells.get(i + 1).is_some_and(|next| next.is_wide_continuation());
        orphan_spacer || lone_head
    })
}

fn screen_text(screen: &Screen) -> Vec<String> {
    screen.lines().iter().map(|line| line.text()).collect()
}

proptest! {
    /// Splitting input at any point yields the same state as one parse
    #[test]
    fn fragmentation_invariance(data in terminal_bytes(), split in any::<prop::sample::Index>()) {
        let at = split.index(data.len() + 1);

        let mut whole = Terminal::new(20, 6);
        whole.parse(&data);

        let mut parts = Terminal::new(20, 6);
        parts.parse(&data[..at]);
        parts.parse(&data[at..]);

        prop_assert_eq!(whole.snapshot(), parts.snapshot());
        prop_assert_eq!(whole.title(), parts.title());
    }

    /// Byte-at-a-time parsing matches one parse
    #[test]
    fn byte_at_a_time(data in terminal_bytes()) {
        let mut whole = Terminal::new(20, 6);
        whole.parse(&data);

        let mut single = Terminal::new(20, 6);
        for byte in &data {
            single.parse(std::slice::from_ref(byte));
        }

        prop_assert_eq!(whole.snapshot(), single.snapshot());
    }

    /// Arbitrary bytes never panic and leave every coordinate in bounds
    #[test]
    fn arbitrary_bytes_stay_in_bounds(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut term = Terminal::new(10, 4);
        term.parse(&data);

        let screen = term.screen();
        let guard = screen.lock();
        let (col, row) = guard.cursor_pos();
        prop_assert!(col < guard.width());
        prop_assert!(row < guard.height());
        let (top, bottom) = guard.scroll_region();
        prop_assert!(top < bottom || guard.height() == 1);
        prop_assert!(bottom < guard.height());
    }

    /// Editing never splits a wide character from its spacer
    #[test]
    fn wide_pairs_stay_intact(
        data in terminal_bytes(),
        cols in 1usize..30,
        rows in 1usize..8,
    ) {
        let mut term = Terminal::new(12, 4);
        term.parse(&data);
        for (row, line) in term.screen().lock().lines().iter().enumerate() {
            prop_assert_eq!(broken_wide_pair(line), None, "row {}", row);
        }

        term.resize(cols, rows);
        term.parse(&data);
        for (row, line) in term.screen().lock().lines().iter().enumerate() {
            prop_assert_eq!(broken_wide_pair(line), None, "row {} after resize", row);
        }
    }

    /// Resizing after arbitrary input keeps the cursor and region in bounds
    #[test]
    fn resize_stays_in_bounds(
        data in terminal_bytes(),
        cols in 1usize..120,
        rows in 1usize..60,
    ) {
        let mut term = Terminal::new(80, 24);
        term.parse(&data);
        term.resize(cols, rows);

        let screen = term.screen();
        let guard = screen.lock();
        prop_assert_eq!((guard.width(), guard.height()), (cols, rows));
        prop_assert_eq!(guard.lines().len(), rows);
        prop_assert!(guard.lines().iter().all(|line| line.cols() == cols));

        let (col, row) = guard.cursor_pos();
        prop_assert!(col < cols && row < rows);
        let (top, bottom) = guard.scroll_region();
        prop_assert!(top <= bottom && bottom < rows);
        let saved = guard.saved_cursor();
        prop_assert!(saved.col < cols && saved.row < rows);
        drop(guard);

        // The resized screen keeps accepting input
        term.parse(&data);
        let (col, row) = term.screen().cursor_pos();
        prop_assert!(col < cols && row < rows);
    }

    /// Scrolling up then down by the same amount restores the rows that
    /// stayed inside the region; the vacated rows come back blank
    #[test]
    fn scroll_round_trip(
        a in 0usize..12,
        b in 0usize..12,
        n in 1usize..12,
    ) {
        let (top, bottom) = (a.min(b), a.max(b));
        prop_assume!(top < bottom);
        let n = n.min(bottom - top + 1);

        let mut screen = Screen::new(8, 12, 100);
        for row in 0..12 {
            screen.move_cursor_to(0, row);
            for ch in format!("row{}", row).chars() {
                screen.write_rune(ch);
            }
        }
        let before = screen_text(&screen);

        screen.set_scroll_region(top, bottom);
        screen.scroll_up(n);
        screen.scroll_down(n);
        let after = screen_text(&screen);

        for row in 0..12 {
            if row < top || row > bottom || row >= top + n {
                prop_assert_eq!(&after[row], &before[row], "row {}", row);
            } else {
                prop_assert_eq!(after[row].as_str(), "", "row {}", row);
            }
        }

        let expected_history = if top == 0 { n } else { 0 };
        prop_assert_eq!(screen.history().len(), expected_history);
    }
}

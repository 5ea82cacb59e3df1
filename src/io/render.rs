//! ASCII rendering of vine layouts for dumps and the terminal

use crate::model::level::Level;
use crate::model::point::Point;
use crate::model::vine::Vine;
use std::collections::HashMap;
use std::fmt::Write;

/// Character drawn for an empty cell
pub const EMPTY_CELL: char = '.';
/// Character drawn for a cell hidden by a mask
pub const MASKED_CELL: char = ' ';

/// Body letter of the vine at `position` in listing order
pub fn body_letter(position: usize) -> char {
    let offset = u8::try_from(position % 26).unwrap_or(0);
    char::from(b'a' + offset)
}

/// Render vines on a `width` x `height` grid
///
/// Rows run from the top of the grid down. Heads show their direction arrow,
/// body cells the vine's letter and empty cells a dot.
pub fn render_vines(width: usize, height: usize, vines: &[Vine]) -> String {
    render_with(width, height, vines, |_| true)
}

/// Render a level, blanking cells its mask hides
pub fn render_level(level: &Level) -> String {
    render_with(level.width(), level.height(), &level.vines, |point| {
        level.is_cell_visible(point)
    })
}

fn render_with(
    width: usize,
    height: usize,
    vines: &[Vine],
    visible: impl Fn(Point) -> bool,
) -> String {
    let mut glyphs: HashMap<Point, char> = HashMap::new();
    for (position, vine) in vines.iter().enumerate() {
        let letter = body_letter(position);
        for (index, &point) in vine.ordered_path.iter().enumerate() {
            let glyph = if index == 0 {
                vine.head_direction.arrow()
            } else {
                letter
            };
            glyphs.insert(point, glyph);
        }
    }

    let mut output = String::with_capacity((width + 1) * height);
    for y in (0..height).rev() {
        for x in 0..width {
            let point = Point::new(x as i32, y as i32);
            let glyph = if visible(point) {
                glyphs.get(&point).copied().unwrap_or(EMPTY_CELL)
            } else {
                MASKED_CELL
            };
            output.push(glyph);
        }
        output.push('\n');
    }
    output
}

/// One line per vine with its id, direction and length
pub fn render_legend(vines: &[Vine]) -> String {
    let mut output = String::new();
    for (position, vine) in vines.iter().enumerate() {
        let _ = writeln!(
            output,
            "{} {} {} len={}",
            body_letter(position),
            vine.id,
            vine.head_direction,
            vine.len()
        );
    }
    output
}

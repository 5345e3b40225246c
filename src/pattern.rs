use crate::universe::{Universe, MIN_LEVEL};
use std::fmt::Write;
use tracing::debug;

/// RLE lines are wrapped at this width.
const RLE_LINE_WIDTH: usize = 70;

/// An inclusive rectangle of cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl Bounds {
    pub fn width(&self) -> u64 {
        self.xmax.abs_diff(self.xmin) + 1
    }

    pub fn height(&self) -> u64 {
        self.ymax.abs_diff(self.ymin) + 1
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        (self.xmin..=self.xmax).contains(&x) && (self.ymin..=self.ymax).contains(&y)
    }
}

/// The bounding box of the cells given as parallel coordinate lists.
///
/// An empty list yields the all-zero rectangle.
pub fn get_bounds(xs: &[i64], ys: &[i64]) -> Bounds {
    debug_assert_eq!(xs.len(), ys.len(), "Coordinate lists must be parallel.");
    let mut cells = xs.iter().zip(ys);
    match cells.next() {
        None => Bounds::default(),
        Some((&x, &y)) => cells.fold(
            Bounds {
                xmin: x,
                ymin: y,
                xmax: x,
                ymax: y,
            },
            |bounds, (&x, &y)| Bounds {
                xmin: bounds.xmin.min(x),
                ymin: bounds.ymin.min(y),
                xmax: bounds.xmax.max(x),
                ymax: bounds.ymax.max(y),
            },
        ),
    }
}

/// Shifts the cells so that the midpoint of `bounds`, rounded down, lands on
/// the origin.
pub fn center_on_origin(xs: &mut [i64], ys: &mut [i64], bounds: &Bounds) {
    let mx = (bounds.xmin + bounds.xmax).div_euclid(2);
    let my = (bounds.ymin + bounds.ymax).div_euclid(2);
    xs.iter_mut().for_each(|x| *x -= mx);
    ys.iter_mut().for_each(|y| *y -= my);
}

/// Appends a run to an RLE body, merging it with the previous run of the same tag.
fn push_run(runs: &mut Vec<(u64, char)>, count: u64, tag: char) {
    match runs.last_mut() {
        Some((n, last)) if *last == tag => *n += count,
        _ => runs.push((count, tag)),
    }
}

impl Universe {
    /// Replaces the universe with the given live cells, centred on the
    /// origin, and saves the result as a rewind state.
    pub fn load_pattern(&mut self, cells: &[(i64, i64)]) -> &mut Self {
        let (mut xs, mut ys): (Vec<i64>, Vec<i64>) = cells.iter().copied().unzip();
        let bounds = get_bounds(&xs, &ys);
        center_on_origin(&mut xs, &mut ys, &bounds);
        self.root = self.empty_node(MIN_LEVEL);
        for (&x, &y) in xs.iter().zip(&ys) {
            self.set_cell(x, y, true);
        }
        self.generation = 0;
        debug!(cells = cells.len(), level = self.level(), "loaded pattern");
        self.save_state();
        self
    }

    /// The live cells as an RLE pattern, with the active rule in its header.
    pub fn to_rle(&self) -> String {
        let mut header = String::new();
        let Some(bounds) = self.bound() else {
            let _ = write!(header, "x = 0, y = 0, rule = {}\n!", self.rule);
            return header;
        };
        let _ = writeln!(
            header,
            "x = {}, y = {}, rule = {}",
            bounds.width(),
            bounds.height(),
            self.rule
        );

        let mut cells = self.live_cells_in(bounds);
        cells.sort_unstable_by_key(|&(x, y)| (y, x));
        let mut runs = Vec::new();
        let (mut row, mut col) = (bounds.ymin, bounds.xmin);
        for (x, y) in cells {
            if y > row {
                push_run(&mut runs, y.abs_diff(row), '$');
                row = y;
                col = bounds.xmin;
            }
            if x > col {
                push_run(&mut runs, x.abs_diff(col), 'b');
            }
            push_run(&mut runs, 1, 'o');
            col = x + 1;
        }
        push_run(&mut runs, 1, '!');

        let mut body = header;
        let mut line_width = 0;
        for (count, tag) in runs {
            let item = if count == 1 {
                tag.to_string()
            } else {
                format!("{}{}", count, tag)
            };
            if line_width + item.len() > RLE_LINE_WIDTH {
                body.push('\n');
                line_width = 0;
            }
            line_width += item.len();
            body.push_str(&item);
        }
        body
    }
}

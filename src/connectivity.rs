//! Border-seeded flood fill over a color mask.
//!
//! Only masked pixels that can reach the outer edge of the image through
//! 4-connected masked neighbors are background. Green regions fully enclosed
//! by foreground (a green gem held by a character, say) are never reached and
//! therefore survive.
//!
//! Membership is defined by reachability alone, so the result does not
//! depend on the order seeds are enumerated or on the traversal strategy.

use std::collections::VecDeque;

use crate::mask::Mask;

/// Worklist discipline for the flood fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// FIFO worklist.
    #[default]
    BreadthFirst,
    /// LIFO worklist.
    DepthFirst,
}

/// Subset of `mask` reachable from the image border.
///
/// Equivalent to [`border_connected_with`] using [`Traversal::BreadthFirst`].
#[must_use]
pub fn border_connected(mask: &Mask) -> Mask {
    border_connected_with(mask, Traversal::BreadthFirst)
}

/// Subset of `mask` reachable from the image border using the given
/// traversal.
///
/// Seeds are every set entry on row 0, row `H-1`, column 0 and column `W-1`.
/// Each pixel is marked and pushed at most once, so time and auxiliary space
/// are both `O(W * H)`.
#[must_use]
pub fn border_connected_with(mask: &Mask, traversal: Traversal) -> Mask {
    let (width, height) = mask.dimensions();
    let mut background = Mask::new(width, height);
    if mask.is_empty() {
        return background;
    }

    let w = width as usize;
    let h = height as usize;
    let src = mask.as_slice();
    let visited = background.as_mut_slice();
    let mut queue: VecDeque<usize> = VecDeque::new();

    let push = |idx: usize, visited: &mut [bool], queue: &mut VecDeque<usize>| {
        if src[idx] && !visited[idx] {
            visited[idx] = true;
            queue.push_back(idx);
        }
    };

    for x in 0..w {
        push(x, visited, &mut queue);
        push((h - 1) * w + x, visited, &mut queue);
    }
    for y in 0..h {
        push(y * w, visited, &mut queue);
        push(y * w + w - 1, visited, &mut queue);
    }

    loop {
        let next = match traversal {
            Traversal::BreadthFirst => queue.pop_front(),
            Traversal::DepthFirst => queue.pop_back(),
        };
        let Some(idx) = next else { break };

        let (x, y) = (idx % w, idx / w);
        if y > 0 {
            push(idx - w, visited, &mut queue);
        }
        if y + 1 < h {
            push(idx + w, visited, &mut queue);
        }
        if x > 0 {
            push(idx - 1, visited, &mut queue);
        }
        if x + 1 < w {
            push(idx + 1, visited, &mut queue);
        }
    }

    tracing::trace!(
        width,
        height,
        keyed = mask.count(),
        reached = background.count(),
        "border flood fill complete"
    );

    background
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parse a mask from rows of `#` (set) and `.` (clear).
    fn mask_from_rows(rows: &[&str]) -> Mask {
        #[allow(clippy::cast_possible_truncation)]
        let (w, h) = (rows[0].len() as u32, rows.len() as u32);
        let bits = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect();
        Mask::from_vec(w, h, bits)
    }

    /// Reference implementation: recursive DFS with seeds visited in reverse
    /// order, nothing shared with the worklist version.
    fn reference_fill(mask: &Mask) -> Mask {
        fn visit(mask: &Mask, out: &mut Mask, x: i64, y: i64) {
            let (w, h) = (i64::from(mask.width()), i64::from(mask.height()));
            if x < 0 || y < 0 || x >= w || y >= h {
                return;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (ux, uy) = (x as u32, y as u32);
            if !mask.get(ux, uy) || out.get(ux, uy) {
                return;
            }
            out.set(ux, uy, true);
            visit(mask, out, x, y + 1);
            visit(mask, out, x - 1, y);
            visit(mask, out, x + 1, y);
            visit(mask, out, x, y - 1);
        }

        let mut out = Mask::new(mask.width(), mask.height());
        let (w, h) = (i64::from(mask.width()), i64::from(mask.height()));
        for y in (0..h).rev() {
            for x in (0..w).rev() {
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    visit(mask, &mut out, x, y);
                }
            }
        }
        out
    }

    fn random_mask(width: u32, height: u32, seed: u64, density: u64) -> Mask {
        let mut state = seed.max(1);
        let bits = (0..width as usize * height as usize)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state % 100 < density
            })
            .collect();
        Mask::from_vec(width, height, bits)
    }

    #[test]
    fn enclosed_region_is_not_reached() {
        let mask = mask_from_rows(&[
            "#####", //
            "#...#", //
            "#.#.#", //
            "#...#", //
            "#####",
        ]);
        let bg = border_connected(&mask);
        assert_eq!(bg.count(), 16);
        assert!(!bg.get(2, 2));
    }

    #[test]
    fn diagonal_contact_does_not_connect() {
        let mask = mask_from_rows(&[
            "#...", //
            ".#..", //
            "..#.", //
            "....",
        ]);
        let bg = border_connected(&mask);
        assert!(bg.get(0, 0));
        assert!(!bg.get(1, 1));
        assert!(!bg.get(2, 2));
    }

    #[test]
    fn winding_corridor_is_followed_to_the_interior() {
        let mask = mask_from_rows(&[
            "......", //
            "#####.", //
            "....#.", //
            ".##.#.", //
            ".#..#.", //
            ".####.",
        ]);
        let bg = border_connected(&mask);
        assert_eq!(bg, mask);
    }

    #[test]
    fn empty_and_single_pixel_masks() {
        assert!(border_connected(&Mask::new(0, 0)).is_empty());
        assert!(border_connected(&Mask::new(0, 7)).is_empty());

        let single = Mask::from_vec(1, 1, vec![true]);
        assert_eq!(border_connected(&single), single);
    }

    #[test]
    fn single_row_and_column_are_all_border() {
        let row = mask_from_rows(&["#.##.#"]);
        assert_eq!(border_connected(&row), row);

        let col = Mask::from_vec(1, 4, vec![true, false, true, true]);
        assert_eq!(border_connected(&col), col);
    }

    #[test]
    fn result_is_independent_of_traversal_strategy() {
        for seed in 1..=20 {
            for density in [30, 55, 70] {
                let mask = random_mask(23, 17, seed, density);
                let bfs = border_connected_with(&mask, Traversal::BreadthFirst);
                let dfs = border_connected_with(&mask, Traversal::DepthFirst);
                let reference = reference_fill(&mask);
                assert_eq!(bfs, dfs, "seed={seed} density={density}");
                assert_eq!(bfs, reference, "seed={seed} density={density}");
                assert!(bfs.is_subset_of(&mask));
            }
        }
    }
}

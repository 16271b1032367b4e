#[cfg(test)]
mod tests;

use std::fmt::{Debug, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Default)]
pub struct Rect {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Debug for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rect")
            .field("x1", &self.x1)
            .field("y1", &self.y1)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Rect {
    pub fn new_sized_saturating(x1: i32, y1: i32, width: i32, height: i32) -> Self {
        Self {
            x1,
            y1,
            x2: x1.saturating_add(width.max(0)),
            y2: y1.saturating_add(height.max(0)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum RegionOp {
    Add(Rect),
    Sub(Rect),
}

/// An immutable region snapshot taken from a `wl_region`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Region {
    ops: Vec<RegionOp>,
}

#[cfg(test)]
impl Rect {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x1 <= x && self.y1 <= y && self.x2 > x && self.y2 > y
    }
}

#[cfg(test)]
impl Region {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let mut res = false;
        for op in &self.ops {
            match op {
                RegionOp::Add(r) if r.contains(x, y) => res = true,
                RegionOp::Sub(r) if r.contains(x, y) => res = false,
                _ => {}
            }
        }
        res
    }

    pub fn is_empty(&self) -> bool {
        !self
            .ops
            .iter()
            .any(|op| matches!(op, RegionOp::Add(r) if !r.is_empty()))
    }
}

#[derive(Default)]
pub struct RegionBuilder {
    ops: Vec<RegionOp>,
}

impl RegionBuilder {
    pub fn add(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.ops.push(RegionOp::Add(rect));
        }
    }

    pub fn sub(&mut self, rect: Rect) {
        if !rect.is_empty() && !self.ops.is_empty() {
            self.ops.push(RegionOp::Sub(rect));
        }
    }

    pub fn get(&self) -> Region {
        Region {
            ops: self.ops.clone(),
        }
    }
}

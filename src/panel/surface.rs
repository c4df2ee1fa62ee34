#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceState {
    #[default]
    Closed,
    Open,
}

/// One display surface's open/closed machine. The desktop dropdown and the
/// mobile sheet each own an independent instance; they are deliberately
/// uncoupled and may disagree, since only one is visible per viewport width.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    state: SurfaceState,
    bounds: Option<Rect>,
    trigger: Option<Rect>,
}

impl Surface {
    pub fn is_open(&self) -> bool {
        self.state == SurfaceState::Open
    }

    pub fn open(&mut self) {
        self.state = SurfaceState::Open;
    }

    pub fn close(&mut self) {
        self.state = SurfaceState::Closed;
    }

    pub fn toggle(&mut self) {
        self.state = match self.state {
            SurfaceState::Open => SurfaceState::Closed,
            SurfaceState::Closed => SurfaceState::Open,
        };
    }

    /// Rendered bounds of the surface itself, refreshed on layout.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    /// Bounds of the control that toggles the surface. Taps on it are not
    /// outside-clicks; the toggle handler owns them.
    pub fn set_trigger(&mut self, trigger: Rect) {
        self.trigger = Some(trigger);
    }

    /// Hit-test a pointer-down. Closes the surface when the point lands
    /// outside both the surface and its trigger; returns whether it closed.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        if !self.is_open() {
            return false;
        }
        let on_surface = self.bounds.map(|rect| rect.contains(point)).unwrap_or(false);
        let on_trigger = self
            .trigger
            .map(|rect| rect.contains(point))
            .unwrap_or(false);
        if on_surface || on_trigger {
            return false;
        }
        self.close();
        true
    }
}

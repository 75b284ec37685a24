use std::time::Duration;

/// Delay between a hover/focus and the menu accepting pointer input.
pub const OPEN_DELAY: Duration = Duration::from_millis(200);
/// Length of the fade-out before a left menu is fully closed.
pub const CLOSE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DropdownId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownPhase {
    Closed,
    /// Locked until the open delay fires.
    Opening,
    Open,
    /// Locked until the close delay fires.
    Closing,
}

impl DropdownPhase {
    pub fn is_locked(self) -> bool {
        matches!(self, DropdownPhase::Opening | DropdownPhase::Closing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownInput {
    HoverEnter,
    HoverLeave,
    Focus,
    Blur,
}

/// Where a pointer press landed relative to the dropdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Trigger(DropdownId),
    Panel(DropdownId),
    Outside,
}

impl PressTarget {
    pub fn dropdown(self) -> Option<DropdownId> {
        match self {
            PressTarget::Trigger(id) | PressTarget::Panel(id) => Some(id),
            PressTarget::Outside => None,
        }
    }
}

/// A delayed transition the caller must run and report back through
/// [`DropdownRegistry::timer_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub id: DropdownId,
    pub token: u64,
    pub delay: Duration,
}

/// How a menu panel should be drawn for its current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuPresentation {
    pub visible: bool,
    pub interactive: bool,
    pub fading: bool,
}

#[derive(Debug, Clone)]
struct Dropdown {
    phase: DropdownPhase,
    pending: Option<u64>,
}

/// Owns every dropdown's phase and the single active dropdown.
#[derive(Debug, Default)]
pub struct DropdownRegistry {
    dropdowns: Vec<Dropdown>,
    active: Option<DropdownId>,
    next_token: u64,
}

impl DropdownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self) -> DropdownId {
        self.dropdowns.push(Dropdown {
            phase: DropdownPhase::Closed,
            pending: None,
        });
        DropdownId(self.dropdowns.len() - 1)
    }

    pub fn active(&self) -> Option<DropdownId> {
        self.active
    }

    pub fn phase(&self, id: DropdownId) -> DropdownPhase {
        self.dropdowns
            .get(id.0)
            .map_or(DropdownPhase::Closed, |d| d.phase)
    }

    pub fn presentation(&self, id: DropdownId) -> MenuPresentation {
        match self.phase(id) {
            DropdownPhase::Closed => MenuPresentation::default(),
            DropdownPhase::Opening => MenuPresentation {
                visible: true,
                interactive: false,
                fading: false,
            },
            DropdownPhase::Open => MenuPresentation {
                visible: true,
                interactive: true,
                fading: false,
            },
            DropdownPhase::Closing => MenuPresentation {
                visible: true,
                interactive: false,
                fading: true,
            },
        }
    }

    pub fn dispatch(&mut self, id: DropdownId, input: DropdownInput) -> Option<TimerRequest> {
        if id.0 >= self.dropdowns.len() {
            return None;
        }
        match input {
            DropdownInput::HoverEnter | DropdownInput::Focus => self.start_open(id),
            DropdownInput::HoverLeave | DropdownInput::Blur => self.start_close(id),
        }
    }

    /// Makes `id` the active dropdown, closing the previous one without delay.
    pub fn activate(&mut self, id: DropdownId) {
        if let Some(previous) = self.active.filter(|prev| *prev != id) {
            tracing::trace!(?previous, ?id, "evicting active dropdown");
            self.force_close(previous);
        }
        self.active = Some(id);
    }

    pub fn force_close_active(&mut self) -> Option<DropdownId> {
        let id = self.active?;
        self.force_close(id);
        Some(id)
    }

    /// A press on the active dropdown's trigger or panel keeps it; any other press closes it.
    pub fn pointer_down(&mut self, target: PressTarget) {
        if self.active.is_some() && self.active != target.dropdown() {
            self.force_close_active();
        }
    }

    /// The pointer left the window or the window lost focus.
    pub fn window_left(&mut self) {
        self.force_close_active();
    }

    /// Resolves a delay scheduled earlier. Returns whether anything changed.
    pub fn timer_fired(&mut self, id: DropdownId, token: u64) -> bool {
        let Some(dropdown) = self.dropdowns.get_mut(id.0) else {
            return false;
        };
        if dropdown.pending != Some(token) {
            return false;
        }
        dropdown.pending = None;
        match dropdown.phase {
            DropdownPhase::Opening => {
                dropdown.phase = DropdownPhase::Open;
                true
            }
            DropdownPhase::Closing => {
                dropdown.phase = DropdownPhase::Closed;
                if self.active == Some(id) {
                    self.active = None;
                }
                true
            }
            DropdownPhase::Closed | DropdownPhase::Open => false,
        }
    }

    fn start_open(&mut self, id: DropdownId) -> Option<TimerRequest> {
        match self.phase(id) {
            DropdownPhase::Opening => None,
            DropdownPhase::Open => {
                self.activate(id);
                None
            }
            DropdownPhase::Closing => {
                let dropdown = &mut self.dropdowns[id.0];
                dropdown.pending = None;
                dropdown.phase = DropdownPhase::Open;
                self.activate(id);
                None
            }
            DropdownPhase::Closed => {
                self.activate(id);
                Some(self.schedule(id, DropdownPhase::Opening, OPEN_DELAY))
            }
        }
    }

    fn start_close(&mut self, id: DropdownId) -> Option<TimerRequest> {
        let phase = self.phase(id);
        if phase.is_locked() || phase == DropdownPhase::Closed {
            return None;
        }
        Some(self.schedule(id, DropdownPhase::Closing, CLOSE_DELAY))
    }

    fn schedule(&mut self, id: DropdownId, phase: DropdownPhase, delay: Duration) -> TimerRequest {
        self.next_token = self.next_token.wrapping_add(1);
        let token = self.next_token;
        let dropdown = &mut self.dropdowns[id.0];
        dropdown.phase = phase;
        dropdown.pending = Some(token);
        TimerRequest { id, token, delay }
    }

    fn force_close(&mut self, id: DropdownId) {
        if let Some(dropdown) = self.dropdowns.get_mut(id.0) {
            dropdown.phase = DropdownPhase::Closed;
            dropdown.pending = None;
        }
        if self.active == Some(id) {
            self.active = None;
        }
    }

    #[cfg(test)]
    fn non_closed(&self) -> usize {
        self.dropdowns
            .iter()
            .filter(|d| d.phase != DropdownPhase::Closed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened(registry: &mut DropdownRegistry, id: DropdownId) {
        let timer = registry.dispatch(id, DropdownInput::HoverEnter).unwrap();
        assert!(registry.timer_fired(id, timer.token));
        assert_eq!(registry.phase(id), DropdownPhase::Open);
    }

    #[test]
    fn hover_opens_after_delay() {
        let mut registry = DropdownRegistry::new();
        let file = registry.register();

        let timer = registry.dispatch(file, DropdownInput::HoverEnter).unwrap();
        assert_eq!(timer.delay, OPEN_DELAY);
        assert_eq!(registry.phase(file), DropdownPhase::Opening);
        let shown = registry.presentation(file);
        assert!(shown.visible && !shown.interactive);

        assert!(registry.timer_fired(file, timer.token));
        assert_eq!(registry.phase(file), DropdownPhase::Open);
        assert!(registry.presentation(file).interactive);
        assert_eq!(registry.active(), Some(file));
    }

    #[test]
    fn leave_fades_then_closes() {
        let mut registry = DropdownRegistry::new();
        let file = registry.register();
        opened(&mut registry, file);

        let timer = registry.dispatch(file, DropdownInput::HoverLeave).unwrap();
        assert_eq!(timer.delay, CLOSE_DELAY);
        assert_eq!(registry.phase(file), DropdownPhase::Closing);
        let shown = registry.presentation(file);
        assert!(shown.visible && shown.fading && !shown.interactive);

        assert!(registry.timer_fired(file, timer.token));
        assert_eq!(registry.phase(file), DropdownPhase::Closed);
        assert_eq!(registry.presentation(file), MenuPresentation::default());
        assert_eq!(registry.active(), None);
    }

    #[test]
    fn retrigger_while_opening_is_ignored() {
        let mut registry = DropdownRegistry::new();
        let file = registry.register();
        let first = registry.dispatch(file, DropdownInput::HoverEnter).unwrap();
        assert!(registry.dispatch(file, DropdownInput::Focus).is_none());
        assert!(registry.dispatch(file, DropdownInput::HoverLeave).is_none());
        assert_eq!(registry.phase(file), DropdownPhase::Opening);
        assert!(registry.timer_fired(file, first.token));
        assert_eq!(registry.phase(file), DropdownPhase::Open);
    }

    #[test]
    fn rehover_while_closing_reopens_immediately() {
        let mut registry = DropdownRegistry::new();
        let file = registry.register();
        opened(&mut registry, file);
        let close = registry.dispatch(file, DropdownInput::HoverLeave).unwrap();

        assert!(registry.dispatch(file, DropdownInput::HoverEnter).is_none());
        assert_eq!(registry.phase(file), DropdownPhase::Open);
        assert!(registry.presentation(file).interactive);

        // The cancelled close must not fire late.
        assert!(!registry.timer_fired(file, close.token));
        assert_eq!(registry.phase(file), DropdownPhase::Open);
    }

    #[test]
    fn opening_second_force_closes_first() {
        for first_open in [false, true] {
            let mut registry = DropdownRegistry::new();
            let file = registry.register();
            let view = registry.register();

            let first_timer = registry.dispatch(file, DropdownInput::HoverEnter).unwrap();
            if first_open {
                registry.timer_fired(file, first_timer.token);
            }

            let second = registry.dispatch(view, DropdownInput::HoverEnter).unwrap();
            assert_eq!(registry.phase(file), DropdownPhase::Closed);
            assert_eq!(registry.presentation(file), MenuPresentation::default());
            assert_eq!(registry.phase(view), DropdownPhase::Opening);
            assert_eq!(registry.active(), Some(view));
            assert_eq!(second.delay, OPEN_DELAY);

            assert!(!registry.timer_fired(file, first_timer.token));
            assert_eq!(registry.phase(file), DropdownPhase::Closed);
        }
    }

    #[test]
    fn closing_dropdown_is_evicted_by_another() {
        let mut registry = DropdownRegistry::new();
        let file = registry.register();
        let help = registry.register();
        opened(&mut registry, file);
        registry.dispatch(file, DropdownInput::HoverLeave).unwrap();

        registry.dispatch(help, DropdownInput::Focus).unwrap();
        assert_eq!(registry.phase(file), DropdownPhase::Closed);
        assert_eq!(registry.non_closed(), 1);
    }

    #[test]
    fn at_most_one_dropdown_is_ever_non_closed() {
        let mut registry = DropdownRegistry::new();
        let ids = [registry.register(), registry.register(), registry.register()];
        let inputs = [
            DropdownInput::HoverEnter,
            DropdownInput::Focus,
            DropdownInput::HoverLeave,
            DropdownInput::Blur,
        ];
        let mut timers = Vec::new();
        for step in 0..200usize {
            let id = ids[(step * 7 + step / 3) % ids.len()];
            let input = inputs[(step * 5 + step / 2) % inputs.len()];
            if let Some(timer) = registry.dispatch(id, input) {
                timers.push(timer);
            }
            if step % 3 == 0 {
                if let Some(timer) = timers.pop() {
                    registry.timer_fired(timer.id, timer.token);
                }
            }
            if step % 17 == 0 {
                registry.pointer_down(PressTarget::Outside);
            }
            assert!(registry.non_closed() <= 1, "step {step}");
        }
    }

    #[test]
    fn outside_press_closes_but_inside_press_does_not() {
        let mut registry = DropdownRegistry::new();
        let file = registry.register();
        let view = registry.register();
        opened(&mut registry, file);

        registry.pointer_down(PressTarget::Trigger(file));
        assert_eq!(registry.phase(file), DropdownPhase::Open);

        registry.pointer_down(PressTarget::Trigger(view));
        assert_eq!(registry.phase(file), DropdownPhase::Closed);
        assert_eq!(registry.active(), None);

        opened(&mut registry, file);
        registry.pointer_down(PressTarget::Outside);
        assert_eq!(registry.phase(file), DropdownPhase::Closed);
    }

    #[test]
    fn press_on_own_panel_keeps_menu_through_every_phase() {
        let mut registry = DropdownRegistry::new();
        let file = registry.register();
        let view = registry.register();

        let timer = registry.dispatch(file, DropdownInput::HoverEnter);
        assert_eq!(registry.phase(file), DropdownPhase::Opening);
        registry.pointer_down(PressTarget::Panel(file));
        assert_eq!(registry.phase(file), DropdownPhase::Opening);

        let timer = timer.expect("opening schedules a timer");
        registry.timer_fired(timer.id, timer.token);
        assert_eq!(registry.phase(file), DropdownPhase::Open);
        registry.pointer_down(PressTarget::Panel(file));
        assert_eq!(registry.phase(file), DropdownPhase::Open);
        assert_eq!(registry.active(), Some(file));

        registry.pointer_down(PressTarget::Panel(view));
        assert_eq!(registry.phase(file), DropdownPhase::Closed);
        assert_eq!(registry.active(), None);
    }

    #[test]
    fn leaving_window_force_closes_from_any_phase() {
        let mut registry = DropdownRegistry::new();
        let file = registry.register();

        let timer = registry.dispatch(file, DropdownInput::HoverEnter).unwrap();
        registry.window_left();
        assert_eq!(registry.phase(file), DropdownPhase::Closed);
        assert!(!registry.timer_fired(file, timer.token));

        opened(&mut registry, file);
        registry.dispatch(file, DropdownInput::Blur).unwrap();
        assert_eq!(registry.force_close_active(), Some(file));
        assert_eq!(registry.phase(file), DropdownPhase::Closed);
        assert_eq!(registry.force_close_active(), None);
    }

    #[test]
    fn close_on_closed_is_noop() {
        let mut registry = DropdownRegistry::new();
        let file = registry.register();
        assert!(registry.dispatch(file, DropdownInput::Blur).is_none());
        assert_eq!(registry.phase(file), DropdownPhase::Closed);
    }

    #[test]
    fn locked_phases() {
        assert!(DropdownPhase::Opening.is_locked());
        assert!(DropdownPhase::Closing.is_locked());
        assert!(!DropdownPhase::Open.is_locked());
        assert!(!DropdownPhase::Closed.is_locked());
    }
}

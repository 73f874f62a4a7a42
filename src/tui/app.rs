use crate::simulation::control::Controller;
use crate::tui::input::Action;

pub struct App {
    pub controller: Controller,
    pub running: bool,
    pub paused: bool,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            running: true,
            paused: false,
        }
    }

    pub fn handle(&mut self, action: Action) {
        match action {
            Action::Simulation(command) => self.controller.apply(command),
            Action::TogglePause => self.paused = !self.paused,
            Action::Quit => self.running = false,
        }
    }

    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        self.controller.tick();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

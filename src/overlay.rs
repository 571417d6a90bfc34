//! The overlay as the event loop sees it: model, input arbitration and the
//! shape animator wired together through the model's change notification.

use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::{ShapeAnimator, ShapeFrame};
use crate::config::{Config, PanelConfig};
use crate::ipc::{self, IpcCommand};
use crate::model::{
    HapticSink, InputArbiter, InputEvent, InputOutcome, OverlayModel, Point, ScreenMetrics,
};

pub struct Overlay {
    model: OverlayModel,
    input: InputArbiter,
    animator: Rc<RefCell<ShapeAnimator>>,
    panel: PanelConfig,
}

impl Overlay {
    pub fn new(
        config: &Config,
        screen: Box<dyn ScreenMetrics>,
        haptics: Option<Box<dyn HapticSink>>,
        activate_app: impl Fn() + 'static,
    ) -> Self {
        let mut model = OverlayModel::new(config.geometry(), screen).with_activator(activate_app);
        if let Some(haptics) = haptics {
            model = model.with_haptics(haptics);
        }

        let animator = Rc::new(RefCell::new(ShapeAnimator::new(
            config.spring(),
            ShapeFrame::target_for(&model),
        )));

        // The only coupling between model and presentation
        let subscriber = animator.clone();
        model.subscribe(move |model| {
            if let Ok(mut animator) = subscriber.try_borrow_mut() {
                animator.retarget(ShapeFrame::target_for(model));
            } else {
                log::warn!("Animator busy, dropping retarget to {}", model.state());
            }
        });
        model.subscribe(ipc::publish_status);
        ipc::publish_status(&model);

        Self {
            model,
            input: InputArbiter::new(),
            animator,
            panel: config.panel.clone(),
        }
    }

    pub fn model(&self) -> &OverlayModel {
        &self.model
    }

    pub fn panel(&self) -> &PanelConfig {
        &self.panel
    }

    pub fn is_hovering(&self) -> bool {
        self.input.is_hovering()
    }

    pub fn is_drop_targeting(&self) -> bool {
        self.input.is_drop_targeting()
    }

    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        self.input.handle(&mut self.model, event)
    }

    pub fn accepts_pointer(&self, pointer: Point) -> bool {
        InputArbiter::accepts_pointer(&self.model, pointer)
    }

    /// Applies a state command received over IPC. `Reload` needs the config
    /// layer and is left to the caller; returns false for it.
    pub fn apply_command(&mut self, command: &IpcCommand) -> bool {
        match command {
            IpcCommand::Open(reason) => self.model.open(*reason),
            IpcCommand::Close => self.model.close(),
            IpcCommand::Toggle => self.model.toggle(),
            IpcCommand::SetVisible(visible) => self.model.set_visible(*visible),
            IpcCommand::Reload => return false,
        }
        true
    }

    pub fn apply_config(&mut self, config: &Config) {
        self.animator.borrow_mut().set_params(config.spring());
        self.panel = config.panel.clone();
        self.model.set_geometry(config.geometry());
    }

    /// Re-derives the animation target, e.g. after the screen changed size.
    pub fn refresh_target(&mut self) {
        self.animator
            .borrow_mut()
            .retarget(ShapeFrame::target_for(&self.model));
    }

    pub fn step_animation(&mut self, dt: f64) -> bool {
        self.animator.borrow_mut().step(dt)
    }

    pub fn is_animating(&self) -> bool {
        self.animator.borrow().is_animating()
    }

    pub fn frame(&self) -> ShapeFrame {
        self.animator.borrow().current()
    }
}

//! # Widget Controller
//!
//! Owns one embedded widget iframe and its message listener.
//!
//! ```text
//!              mount()                 destroy()
//!  Unmounted ───────────► Mounted ─────────────────► Destroyed
//!      ▲                    │                            ▲
//!      └────── unmount() ───┘                            │
//!      └──────────────────── destroy() ──────────────────┘
//! ```
//!
//! The controller is generic over [`WidgetHost`], the platform that creates
//! elements and delivers message events. `ramp-wasm` implements it on top of
//! the browser DOM.
//!
//! Policies:
//! - `mount` while mounted fails with [`RampError::AlreadyMounted`] and
//!   attaches nothing.
//! - `mount` after `destroy` fails with [`RampError::Destroyed`].
//! - Callbacks run synchronously inside the host's message delivery; the
//!   controller does not catch their failures.

use crate::error::{RampError, RampResult};
use crate::message::MessageRelay;
use crate::widget::{ContainerRef, FrameSpec, WidgetOptions};
use std::mem;
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

/// Platform operations needed to embed the widget.
///
/// Each listener handle returned by [`WidgetHost::add_message_listener`]
/// identifies exactly one registration; removing it must not affect
/// registrations made by other controllers.
pub trait WidgetHost {
    /// Container element type
    type Element: Clone;
    /// Created iframe type
    type Frame;
    /// Registration handle for a message listener
    type Listener;

    /// Look up a container by selector.
    fn query_selector(&self, selector: &str) -> RampResult<Option<Self::Element>>;

    /// Create a detached iframe described by `spec`.
    fn create_frame(&self, spec: &FrameSpec) -> RampResult<Self::Frame>;

    fn append_frame(&self, container: &Self::Element, frame: &Self::Frame) -> RampResult<()>;

    /// Detach `frame`. Must tolerate a frame that was already removed.
    fn remove_frame(&self, frame: &Self::Frame);

    /// Register `relay` on the host-wide message stream.
    fn add_message_listener(&self, relay: Rc<MessageRelay>) -> RampResult<Self::Listener>;

    fn remove_message_listener(&self, listener: Self::Listener);
}

struct Mounted<H: WidgetHost> {
    container: H::Element,
    frame: H::Frame,
    listener: H::Listener,
}

enum MountState<H: WidgetHost> {
    Unmounted,
    Mounted(Mounted<H>),
    Destroyed,
}

struct Retained<E> {
    options: WidgetOptions<E>,
    relay: Rc<MessageRelay>,
}

/// Lifecycle manager for one embedded widget
pub struct WidgetController<H: WidgetHost> {
    host: H,
    retained: Option<Retained<H::Element>>,
    state: MountState<H>,
}

impl<H: WidgetHost> WidgetController<H> {
    /// Create a controller. Fails when the session token is blank.
    ///
    /// The callbacks move out of `options` into the message relay.
    pub fn new(host: H, mut options: WidgetOptions<H::Element>) -> RampResult<Self> {
        options.validate()?;
        let callbacks = mem::take(&mut options.callbacks);
        let relay = Rc::new(MessageRelay::new(
            options.environment.widget_host(),
            callbacks,
        ));

        Ok(Self {
            host,
            retained: Some(Retained { options, relay }),
            state: MountState::Unmounted,
        })
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.state, MountState::Mounted(_))
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, MountState::Destroyed)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Attach the widget iframe and start relaying messages.
    ///
    /// `container` overrides the one given at construction.
    #[instrument(skip(self, container))]
    pub fn mount(&mut self, container: Option<ContainerRef<H::Element>>) -> RampResult<()> {
        match self.state {
            MountState::Destroyed => return Err(RampError::Destroyed),
            MountState::Mounted(_) => return Err(RampError::AlreadyMounted),
            MountState::Unmounted => {}
        }
        let retained = self.retained.as_ref().ok_or(RampError::Destroyed)?;

        let target = container
            .or_else(|| retained.options.container.clone())
            .ok_or(RampError::ContainerMissing)?;
        let container = self.resolve_container(target)?;

        let spec = retained.options.frame_spec()?;
        let frame = self.host.create_frame(&spec)?;
        let listener = self.host.add_message_listener(retained.relay.clone())?;

        if let Err(e) = self.host.append_frame(&container, &frame) {
            warn!(error = %e, "Failed to attach widget frame");
            self.host.remove_message_listener(listener);
            return Err(e);
        }

        info!(
            environment = %retained.options.environment,
            "Mounted ramp widget"
        );
        self.state = MountState::Mounted(Mounted {
            container,
            frame,
            listener,
        });
        Ok(())
    }

    /// Remove the iframe and release the listener. No-op when not mounted.
    #[instrument(skip(self))]
    pub fn unmount(&mut self) {
        let MountState::Mounted(mounted) = mem::replace(&mut self.state, MountState::Unmounted)
        else {
            return;
        };
        self.release(mounted);
        debug!("Unmounted ramp widget");
    }

    /// Unmount and drop options, callbacks and container references.
    pub fn destroy(&mut self) {
        if let MountState::Mounted(mounted) =
            mem::replace(&mut self.state, MountState::Destroyed)
        {
            self.release(mounted);
        }
        self.retained = None;
        debug!("Destroyed ramp widget");
    }

    fn release(&self, mounted: Mounted<H>) {
        let Mounted {
            container,
            frame,
            listener,
        } = mounted;
        self.host.remove_frame(&frame);
        self.host.remove_message_listener(listener);
        drop(container);
    }

    fn resolve_container(&self, target: ContainerRef<H::Element>) -> RampResult<H::Element> {
        match target {
            ContainerRef::Element(element) => Ok(element),
            ContainerRef::Selector(selector) => self
                .host
                .query_selector(&selector)?
                .ok_or(RampError::ContainerNotFound { selector }),
        }
    }
}

impl<H: WidgetHost> Drop for WidgetController<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::RampCallbacks;
    use crate::environment::Environment;
    use crate::message::MessagePayload;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// In-memory host: containers are names, frames are ids.
    #[derive(Default)]
    struct FakeHost {
        containers: Vec<String>,
        next_id: Cell<u32>,
        attached: RefCell<Vec<(String, u32)>>,
        frames: RefCell<HashMap<u32, FrameSpec>>,
        listeners: RefCell<HashMap<u32, Rc<MessageRelay>>>,
        fail_append: Cell<bool>,
    }

    impl FakeHost {
        fn with_containers(names: &[&str]) -> Self {
            Self {
                containers: names.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }

        fn next(&self) -> u32 {
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            id
        }

        fn deliver(&self, origin: &str, payload: MessagePayload) {
            let listeners: Vec<_> = self.listeners.borrow().values().cloned().collect();
            for relay in listeners {
                relay.relay(origin, &payload);
            }
        }

        fn attached_count(&self) -> usize {
            self.attached.borrow().len()
        }

        fn listener_count(&self) -> usize {
            self.listeners.borrow().len()
        }
    }

    impl WidgetHost for &FakeHost {
        type Element = String;
        type Frame = u32;
        type Listener = u32;

        fn query_selector(&self, selector: &str) -> RampResult<Option<String>> {
            Ok(self.containers.iter().find(|c| *c == selector).cloned())
        }

        fn create_frame(&self, spec: &FrameSpec) -> RampResult<u32> {
            let id = self.next();
            self.frames.borrow_mut().insert(id, spec.clone());
            Ok(id)
        }

        fn append_frame(&self, container: &String, frame: &u32) -> RampResult<()> {
            if self.fail_append.get() {
                return Err(RampError::Host("appendChild failed".into()));
            }
            self.attached.borrow_mut().push((container.clone(), *frame));
            Ok(())
        }

        fn remove_frame(&self, frame: &u32) {
            self.attached.borrow_mut().retain(|(_, f)| f != frame);
        }

        fn add_message_listener(&self, relay: Rc<MessageRelay>) -> RampResult<u32> {
            let id = self.next();
            self.listeners.borrow_mut().insert(id, relay);
            Ok(id)
        }

        fn remove_message_listener(&self, listener: u32) {
            self.listeners.borrow_mut().remove(&listener);
        }
    }

    const ORIGIN: &str = "https://ramp.example.com";

    fn text(s: &str) -> MessagePayload {
        MessagePayload::Text(s.to_string())
    }

    #[test]
    fn test_blank_session_token_rejected() {
        let host = FakeHost::default();
        let result = WidgetController::new(&host, WidgetOptions::new(""));
        assert!(matches!(result, Err(RampError::Validation(_))));
    }

    #[test]
    fn test_mount_requires_container() {
        let host = FakeHost::default();
        let mut controller = WidgetController::new(&host, WidgetOptions::new("st")).unwrap();

        assert!(matches!(
            controller.mount(None),
            Err(RampError::ContainerMissing)
        ));
        assert!(matches!(
            controller.mount(Some(ContainerRef::Selector("#missing".into()))),
            Err(RampError::ContainerNotFound { .. })
        ));
        assert!(!controller.is_mounted());
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_mount_builds_frame() {
        let host = FakeHost::with_containers(&["#ramp"]);
        let options = WidgetOptions::new("st_abc")
            .with_environment(Environment::Voltorb)
            .with_secret("shh")
            .with_selector("#ramp")
            .with_size(400u32, "700px");
        let mut controller = WidgetController::new(&host, options).unwrap();

        controller.mount(None).unwrap();

        let frames = host.frames.borrow();
        let spec = frames.values().next().unwrap();
        assert_eq!(
            spec.src,
            "https://ramp.voltorb.example.com/?session_token=st_abc&secret=shh"
        );
        assert_eq!(spec.width, "400px");
        assert_eq!(spec.height, "700px");
        assert_eq!(*host.attached.borrow(), vec![("#ramp".to_string(), 1)]);
    }

    #[test]
    fn test_explicit_container_overrides_options() {
        let host = FakeHost::with_containers(&["#a", "#b"]);
        let options = WidgetOptions::new("st").with_selector("#a");
        let mut controller = WidgetController::new(&host, options).unwrap();

        controller
            .mount(Some(ContainerRef::Element("#b".to_string())))
            .unwrap();
        assert_eq!(host.attached.borrow()[0].0, "#b");
    }

    #[test]
    fn test_remount_cycle_leaves_single_frame_and_listener() {
        let host = FakeHost::with_containers(&["#ramp"]);
        let mut controller =
            WidgetController::new(&host, WidgetOptions::new("st").with_selector("#ramp")).unwrap();

        controller.mount(None).unwrap();
        controller.unmount();
        assert_eq!(host.attached_count(), 0);
        assert_eq!(host.listener_count(), 0);

        controller.mount(None).unwrap();
        assert_eq!(host.attached_count(), 1);
        assert_eq!(host.listener_count(), 1);
    }

    #[test]
    fn test_mount_while_mounted_is_rejected() {
        let host = FakeHost::with_containers(&["#ramp"]);
        let mut controller =
            WidgetController::new(&host, WidgetOptions::new("st").with_selector("#ramp")).unwrap();

        controller.mount(None).unwrap();
        assert!(matches!(
            controller.mount(None),
            Err(RampError::AlreadyMounted)
        ));
        assert_eq!(host.attached_count(), 1);
        assert_eq!(host.listener_count(), 1);
    }

    #[test]
    fn test_unmount_is_idempotent_and_tolerates_external_detach() {
        let host = FakeHost::with_containers(&["#ramp"]);
        let mut controller =
            WidgetController::new(&host, WidgetOptions::new("st").with_selector("#ramp")).unwrap();

        controller.unmount();
        controller.mount(None).unwrap();
        host.attached.borrow_mut().clear();

        controller.unmount();
        controller.unmount();
        assert_eq!(host.listener_count(), 0);
        assert!(!controller.is_mounted());
    }

    #[test]
    fn test_failed_append_releases_listener() {
        let host = FakeHost::with_containers(&["#ramp"]);
        host.fail_append.set(true);
        let mut controller =
            WidgetController::new(&host, WidgetOptions::new("st").with_selector("#ramp")).unwrap();

        assert!(matches!(controller.mount(None), Err(RampError::Host(_))));
        assert_eq!(host.listener_count(), 0);
        assert!(!controller.is_mounted());
    }

    #[test]
    fn test_destroy_then_mount_fails() {
        let host = FakeHost::with_containers(&["#ramp"]);
        let mut controller =
            WidgetController::new(&host, WidgetOptions::new("st").with_selector("#ramp")).unwrap();

        controller.mount(None).unwrap();
        controller.destroy();
        assert!(controller.is_destroyed());
        assert_eq!(host.attached_count(), 0);
        assert_eq!(host.listener_count(), 0);

        assert!(matches!(controller.mount(None), Err(RampError::Destroyed)));
        assert_eq!(host.attached_count(), 0);
    }

    #[test]
    fn test_messages_reach_callbacks_only_while_mounted() {
        let host = FakeHost::with_containers(&["#ramp"]);
        let readies = Rc::new(Cell::new(0));
        let steps = Rc::new(RefCell::new(Vec::new()));
        let (r, s) = (readies.clone(), steps.clone());

        let callbacks = RampCallbacks::new()
            .on_ready(move || r.set(r.get() + 1))
            .on_step_change(move |step| s.borrow_mut().push(step));
        let options = WidgetOptions::new("st")
            .with_selector("#ramp")
            .with_callbacks(callbacks);
        let mut controller = WidgetController::new(&host, options).unwrap();

        host.deliver(ORIGIN, text(r#"{"type":"WIDGET_READY"}"#));
        assert_eq!(readies.get(), 0);

        controller.mount(None).unwrap();
        host.deliver(ORIGIN, text(r#"{"type":"WIDGET_READY"}"#));
        host.deliver(
            ORIGIN,
            text(r#"{"type":"WIDGET_STEP_CHANGE","payload":{"step":"kyc"}}"#),
        );
        host.deliver("https://other.example.org", text(r#"{"type":"WIDGET_READY"}"#));
        host.deliver(ORIGIN, text("[iFrameResizerChild]ping"));

        assert_eq!(readies.get(), 1);
        assert_eq!(*steps.borrow(), vec![Some("kyc".to_string())]);

        controller.unmount();
        host.deliver(ORIGIN, text(r#"{"type":"WIDGET_READY"}"#));
        assert_eq!(readies.get(), 1);
    }

    #[test]
    fn test_instances_release_only_their_own_listener() {
        let host = FakeHost::with_containers(&["#a", "#b"]);
        let mut first =
            WidgetController::new(&host, WidgetOptions::new("st1").with_selector("#a")).unwrap();
        let mut second =
            WidgetController::new(&host, WidgetOptions::new("st2").with_selector("#b")).unwrap();

        first.mount(None).unwrap();
        second.mount(None).unwrap();
        assert_eq!(host.listener_count(), 2);

        first.unmount();
        assert_eq!(host.listener_count(), 1);
        assert_eq!(*host.attached.borrow(), vec![("#b".to_string(), 3)]);
        assert!(second.is_mounted());
    }

    #[test]
    fn test_drop_releases_resources() {
        let host = FakeHost::with_containers(&["#ramp"]);
        {
            let mut controller =
                WidgetController::new(&host, WidgetOptions::new("st").with_selector("#ramp"))
                    .unwrap();
            controller.mount(None).unwrap();
        }
        assert_eq!(host.attached_count(), 0);
        assert_eq!(host.listener_count(), 0);
    }
}

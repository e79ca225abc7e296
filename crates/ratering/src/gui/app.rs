use crate::events::{AppEvent, CardInfo};
use crate::gui::ring::{self, State};
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window;
use gtk::prelude::*;
use gtk4 as gtk;
use ratekit::animator::PULSE_DURATION;
use ratekit::control::Command;
use ratekit::data::DataSource;
use ratekit::{Completion, Frame};
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

pub struct AppModel {
    pub state: Rc<RefCell<State>>,
    pub visible: bool,
    pub commands: async_channel::Sender<Command>,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Show,
    Hide,
    Replay,
    Redraw,
    Cards {
        generation: u64,
        size: f64,
        cards: Vec<CardInfo>,
        source: DataSource,
        last_updated: Option<String>,
    },
    Frame {
        generation: u64,
        card: usize,
        frame: Frame,
    },
    AnimationDone {
        generation: u64,
        card: usize,
        completion: Completion,
    },
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Show => AppMsg::Show,
            AppEvent::Hide => AppMsg::Hide,
            AppEvent::Cards {
                generation,
                size,
                cards,
                source,
                last_updated,
            } => AppMsg::Cards {
                generation,
                size,
                cards,
                source,
                last_updated,
            },
            AppEvent::Frame {
                generation,
                card,
                frame,
            } => AppMsg::Frame {
                generation,
                card,
                frame,
            },
            AppEvent::AnimationDone {
                generation,
                card,
                completion,
            } => AppMsg::AnimationDone {
                generation,
                card,
                completion,
            },
        }
    }
}

impl AppModel {
    fn resize(&self) {
        let (width, height) = self.state.borrow().canvas_size();
        self.drawing_area.set_content_width(width);
        self.drawing_area.set_content_height(height);
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (
        State,
        async_channel::Sender<Command>,
        async_channel::Receiver<AppEvent>,
    );
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Ratering"),
            #[watch]
            set_visible: model.visible,
            add_css_class: "ratering-window",
            set_decorated: false,
            set_resizable: false,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Hide);
                        return glib::Propagation::Stop;
                    }
                    if key == gtk::gdk::Key::r || key == gtk::gdk::Key::space {
                        sender.input(AppMsg::Replay);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                add_css_class: "ratering-drawing-area",

                add_controller = gtk::GestureClick {
                    connect_released[sender] => move |_, _, _, _| {
                        sender.input(AppMsg::Replay);
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (state, commands, rx) = init;

        theme::load_css();
        window::init_layer_shell(&root);

        let model = AppModel {
            state: Rc::new(RefCell::new(state)),
            visible: true,
            commands,
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();
        model.resize();

        let state_draw = model.state.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = ring::draw(cr, &state_draw.borrow(), &colors, Instant::now()) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Show => {
                self.visible = true;
                self.drawing_area.queue_draw();
            }
            AppMsg::Hide => {
                self.visible = false;
            }
            AppMsg::Replay => {
                if let Err(e) = self.commands.try_send(Command::Reload) {
                    log::warn!("Replay request dropped: {}", e);
                }
            }
            AppMsg::Redraw => self.drawing_area.queue_draw(),
            AppMsg::Cards {
                generation,
                size,
                cards,
                source,
                last_updated,
            } => {
                let resized = self.state.borrow_mut().set_cards(
                    generation,
                    size,
                    cards,
                    source,
                    last_updated,
                );
                if resized {
                    self.resize();
                }
                self.drawing_area.queue_draw();
            }
            AppMsg::Frame {
                generation,
                card,
                frame,
            } => {
                let action =
                    self.state
                        .borrow_mut()
                        .apply_frame(generation, card, frame, Instant::now());
                if action.pulse_started {
                    let sender = sender.clone();
                    glib::timeout_add_local_once(PULSE_DURATION, move || {
                        sender.input(AppMsg::Redraw);
                    });
                }
                if action.should_redraw && self.visible {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::AnimationDone {
                generation,
                card,
                completion,
            } => {
                log::debug!("Card {} of generation {}: {}", card, generation, completion);
                if self
                    .state
                    .borrow_mut()
                    .finish(generation, card, completion)
                {
                    self.drawing_area.queue_draw();
                }
            }
        }
    }
}

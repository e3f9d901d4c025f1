use std::error::Error;
use std::sync::Arc;

use iced::widget::image::Handle;
use iced::widget::{container, stack};
use iced::{Element, Length, Task, Theme};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod gateway;
mod pending;
mod state;
mod ui;

use config::Config;
use gateway::ImageEditGateway;
use pending::PendingEdit;
use state::catalog::Catalog;
use state::data::ImageRef;
use state::session::{Command, Effect, Session};
use ui::images::ImageCache;

/// Main application state
struct Storefront {
    /// Catalog, cart, editor and UI signals
    session: Session,
    /// Shared with in-flight edit tasks
    gateway: Arc<ImageEditGateway>,
    /// Decoded product photos
    images: ImageCache,
    /// Abort handle for the edit request of the open editor
    pending_edit: PendingEdit,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Anything the session itself handles
    Session(Command),
    /// A product image finished loading (or failed to)
    ImageLoaded(ImageRef, Option<Handle>),
}

impl Storefront {
    fn new(gateway: ImageEditGateway) -> (Self, Task<Message>) {
        // The catalog is static seed data, nothing to load from disk
        let catalog = Catalog::seeded();
        info!(products = catalog.len(), "storefront ready");

        let mut storefront = Storefront {
            session: Session::new(catalog),
            gateway: Arc::new(gateway),
            images: ImageCache::default(),
            pending_edit: PendingEdit::default(),
        };

        // Start fetching the product photos of the first page
        let task = storefront.load_images();

        (storefront, task)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Session(command) => {
                // A result for the tracked request means its handle is spent
                if let Command::EditFinished { session, .. } = &command {
                    self.pending_edit.finish(*session);
                }

                // Let the session change state, then run whatever it asks for
                let effects = self.session.apply(command);
                let mut tasks: Vec<Task<Message>> =
                    effects.into_iter().map(|effect| self.run(effect)).collect();

                // The visible list, cart or preview may show new images now
                tasks.push(self.load_images());

                Task::batch(tasks)
            }
            Message::ImageLoaded(image, handle) => {
                // A failed load stays failed, the placeholder says so
                self.images.finish(image, handle);
                Task::none()
            }
        }
    }

    /// Turn one session effect into background work
    fn run(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::StartEdit {
                session,
                image,
                instruction,
            } => {
                // The gateway outlives this call, so the task holds its own reference
                let gateway = Arc::clone(&self.gateway);
                let (task, handle) = Task::perform(
                    async move { gateway.edit(&image, &instruction).await },
                    move |result| Message::Session(Command::EditFinished { session, result }),
                )
                .abortable();

                // Keep the handle so closing the editor can stop the request
                self.pending_edit.start(session, handle);
                task
            }
            Effect::CancelEdit { session } => {
                self.pending_edit.cancel(session);
                Task::none()
            }
            Effect::ExpireToast { id, after } => {
                // Expiry of an outdated toast is ignored by the session
                Task::perform(tokio::time::sleep(after), move |()| {
                    Message::Session(Command::ToastExpired(id))
                })
            }
            Effect::HapticPulse => {
                debug!("haptic pulse requested; no vibration motor on desktop");
                Task::none()
            }
        }
    }

    /// Start loading every image currently on screen that is not cached yet
    fn load_images(&mut self) -> Task<Message> {
        let on_screen = self
            .session
            .visible()
            .iter()
            .map(|product| &product.image)
            .chain(self.session.cart().items().iter().map(|item| &item.product.image))
            .chain(self.session.editor().map(|editor| editor.preview()));
        let pending = self.images.request(on_screen);

        Task::batch(pending.into_iter().map(|image| {
            let client = self.gateway.client().clone();
            Task::perform(ui::images::load(client, image.clone()), image_loaded(image))
        }))
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        // The editor takes precedence over the cart, the cart over help
        let page = if let Some(editor) = self.session.editor() {
            ui::editor::view(editor, &self.images)
        } else if self.session.is_cart_open() {
            ui::cart::view(&self.session, &self.images)
        } else if self.session.is_help_open() {
            ui::help::view()
        } else {
            ui::storefront::view(&self.session, &self.images)
        };

        let page = container(page)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill);

        // The toast floats above whichever page is showing
        match self.session.toast() {
            Some(message) => stack![
                page,
                container(ui::toast(message))
                    .center_x(Length::Fill)
                    .align_bottom(Length::Fill)
                    .padding(24),
            ]
            .into(),
            None => page.into(),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

/// Tags a finished image load with its reference; iced may call it more than once
fn image_loaded(image: ImageRef) -> impl Fn(Option<Handle>) -> Message {
    move |handle| Message::ImageLoaded(image.clone(), handle)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // A missing API key is not fatal, edits just fail later
    let config = Config::load()?;
    let gateway = ImageEditGateway::new(config.gateway)?;

    iced::application("BabyMilk Pro", Storefront::update, Storefront::view)
        .theme(Storefront::theme)
        .centered()
        .run_with(move || Storefront::new(gateway))?;

    Ok(())
}

use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, pick_list, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Pixels, Point, Rectangle, Renderer, Size, Subscription,
    Task, Theme,
};
use projection::Projection;
use radcore::presentation::{CaptureForm, MapView, MarkerView};
use radcore::{DoseUnit, GeoPoint};
use serde::Deserialize;
use std::time::Duration;

mod projection;

const SERVER_URL: &str = "http://127.0.0.1:9000";
const HISTORY_LIMIT: usize = 20;

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "RadMap Visualizer".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Light
}

#[derive(Debug)]
struct Visualizer {
    form: FormState,
    view: Option<MapView>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    ViewFetched(Result<MapView, String>),
    MapClicked(GeoPoint),
    ValueChanged(String),
    UnitSelected(DoseUnit),
    TimeChanged(String),
    Submit,
    Undo,
    Clear,
    Done(Result<String, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                form: FormState::default(),
                view: None,
                status: "Connecting to server...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_view(), Message::ViewFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_view(), Message::ViewFetched),
            Message::ViewFetched(Ok(view)) => {
                if !state.form.time_edited {
                    state.form.time = view.default_time.clone();
                }
                state.view = Some(view);
                Task::none()
            }
            Message::ViewFetched(Err(err)) => {
                state.status = format!("Server unreachable: {err}");
                Task::none()
            }
            Message::MapClicked(point) => {
                state.form.time_edited = false;
                state.push_history(format!("Picked {:.5}, {:.5}", point.lat, point.lon));
                Task::perform(post_click(point), Message::ViewFetched)
            }
            Message::ValueChanged(value) => {
                state.form.value = value;
                Task::none()
            }
            Message::UnitSelected(unit) => {
                state.form.unit = unit;
                Task::none()
            }
            Message::TimeChanged(value) => {
                state.form.time = value;
                state.form.time_edited = true;
                Task::none()
            }
            Message::Submit => match state.form.to_capture() {
                Ok(form) => {
                    state.form.time_edited = false;
                    Task::perform(post_form(form), Message::Done)
                }
                Err(err) => {
                    state.status = err;
                    Task::none()
                }
            },
            Message::Undo => Task::perform(post_action("undo", "Removed last point"), Message::Done),
            Message::Clear => Task::perform(post_action("clear", "Table cleared"), Message::Done),
            Message::Done(Ok(message)) => {
                state.status = message.clone();
                state.push_history(message);
                Task::perform(fetch_view(), Message::ViewFetched)
            }
            Message::Done(Err(err)) => {
                state.status = format!("Request failed: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let capture_at = state
            .view
            .as_ref()
            .map(|view| format!("{:.5}, {:.5}", view.capture_at.lat, view.capture_at.lon))
            .unwrap_or_else(|| "n/a".into());
        let can_undo = state.view.as_ref().is_some_and(MapView::can_undo);

        let mut undo = button("Remove last point").padding(10);
        if can_undo {
            undo = undo.on_press(Message::Undo);
        }

        let form_column = column![
            text("Measurement").size(26),
            text(format!("Point: {capture_at}")).size(14),
            text_input("Dose rate", &state.form.value)
                .on_input(Message::ValueChanged)
                .padding(6),
            pick_list(DoseUnit::ALL, Some(state.form.unit), Message::UnitSelected).padding(6),
            text_input("Time", &state.form.time)
                .on_input(Message::TimeChanged)
                .padding(6),
            button("Save measurement")
                .on_press(Message::Submit)
                .padding(10),
            undo,
            button("Clear everything")
                .on_press(Message::Clear)
                .padding(10),
            text(&state.status).size(14),
            text(format!("Exports: {SERVER_URL}/export/csv, {SERVER_URL}/export/map")).size(12),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(340.0));

        let point_info = match &state.view {
            Some(view) => text(format!("Points: {}", view.point_count)).size(18),
            None => text("Points: n/a").size(18),
        };

        let map = Canvas::new(DoseMap {
            view: state.view.clone(),
        })
        .width(Length::Fill)
        .height(Length::Fixed(420.0));

        let marker_entries = match &state.view {
            Some(view) if !view.markers.is_empty() => view.markers.iter().rev().take(8).fold(
                Column::new().spacing(4),
                |col, marker| col.push(text(marker.label.clone()).size(12)),
            ),
            _ => Column::new().push(text("No measurements yet").size(12)),
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let map_column = column![
            text("Map").size(26),
            point_info,
            map,
            text("Latest measurements").size(16),
            Container::new(marker_entries).padding(6),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![form_column, map_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }
}

#[derive(Debug, Clone)]
struct FormState {
    value: String,
    unit: DoseUnit,
    time: String,
    time_edited: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            value: "0.00".into(),
            unit: DoseUnit::default(),
            time: String::new(),
            time_edited: false,
        }
    }
}

impl FormState {
    fn to_capture(&self) -> Result<CaptureForm, String> {
        let raw = self.value.trim().replace(',', ".");
        let value = if raw.is_empty() {
            None
        } else {
            Some(
                raw.parse::<f64>()
                    .map_err(|_| format!("`{}` is not a number", self.value))?,
            )
        };
        Ok(CaptureForm {
            value,
            unit: Some(self.unit.label().to_string()),
            time: Some(self.time.clone()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MutationReply {
    point_count: usize,
}

async fn fetch_view() -> Result<MapView, String> {
    let response = reqwest::get(format!("{SERVER_URL}/api/view"))
        .await
        .map_err(|e| e.to_string())?;
    response.json::<MapView>().await.map_err(|e| e.to_string())
}

async fn post_click(point: GeoPoint) -> Result<MapView, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{SERVER_URL}/api/click"))
        .json(&point)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    response.json::<MapView>().await.map_err(|e| e.to_string())
}

async fn post_form(form: CaptureForm) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{SERVER_URL}/api/points"))
        .json(&form)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let reply = read_mutation(response).await?;
    Ok(format!("Saved ({} points)", reply.point_count))
}

async fn post_action(action: &'static str, done: &'static str) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{SERVER_URL}/api/{action}"))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let reply = read_mutation(response).await?;
    Ok(format!("{done} ({} points)", reply.point_count))
}

async fn read_mutation(response: reqwest::Response) -> Result<MutationReply, String> {
    if response.status().is_success() {
        response
            .json::<MutationReply>()
            .await
            .map_err(|e| e.to_string())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_else(|_| "".into());
        Err(format!("{}: {}", status, text))
    }
}

#[derive(Clone)]
struct DoseMap {
    view: Option<MapView>,
}

impl DoseMap {
    fn projection(&self, size: Size) -> Option<Projection> {
        self.view
            .as_ref()
            .map(|view| Projection::new(view.center, view.zoom, size.width, size.height))
    }
}

impl canvas::Program<Message> for DoseMap {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let position = cursor.position_in(bounds)?;
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let projection = self.projection(bounds.size())?;
                let point = projection.to_geo(position.x, position.y);
                Some(canvas::Action::publish(Message::MapClicked(point)).and_capture())
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.93, 0.95, 0.97),
        );

        let Some(view) = &self.view else {
            return vec![frame.into_geometry()];
        };
        let projection = Projection::new(view.center, view.zoom, bounds.width, bounds.height);

        let grid = Path::new(|builder| {
            for step in 1..4 {
                let x = bounds.width * step as f32 / 4.0;
                let y = bounds.height * step as f32 / 4.0;
                builder.move_to(Point::new(x, 0.0));
                builder.line_to(Point::new(x, bounds.height));
                builder.move_to(Point::new(0.0, y));
                builder.line_to(Point::new(bounds.width, y));
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_color(Color::from_rgb(0.8, 0.82, 0.86))
                .with_width(1.0),
        );

        for marker in &view.markers {
            draw_marker(&mut frame, &projection, marker);
        }

        if let Some(click) = view.pending_click {
            let (x, y) = projection.to_screen(click);
            let ring = Path::new(|builder| builder.circle(Point::new(x, y), 9.0));
            frame.stroke(
                &ring,
                Stroke::default()
                    .with_width(2.5)
                    .with_color(Color::from_rgb(0.9, 0.32, 0.0)),
            );
        }

        vec![frame.into_geometry()]
    }
}

fn draw_marker(frame: &mut Frame, projection: &Projection, marker: &MarkerView) {
    let (x, y) = projection.to_screen(marker.position);
    if !projection.contains(x, y) {
        return;
    }

    // Pin tip sits on the coordinate, triangle above it.
    let pin = Path::new(|builder| {
        builder.move_to(Point::new(x, y));
        builder.line_to(Point::new(x - 9.0, y - 18.0));
        builder.line_to(Point::new(x + 9.0, y - 18.0));
        builder.close();
    });
    frame.fill(&pin, Color::from_rgb(0.0, 0.0, 0.85));
    let core = Path::new(|builder| builder.circle(Point::new(x, y - 13.0), 4.0));
    frame.fill(&core, Color::from_rgb(1.0, 0.9, 0.0));

    frame.fill_text(canvas::Text {
        content: marker.label.clone(),
        position: Point::new(x + 12.0, y - 20.0),
        color: Color::from_rgb(0.0, 0.0, 0.85),
        size: Pixels(12.0),
        ..canvas::Text::default()
    });
}

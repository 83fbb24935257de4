use std::time::Instant;

use ratatui::Frame;
use ratatui::widgets::Clear;

use crate::core::state::App;
use crate::engine::{BrowserEngine, TextRendering};
use crate::tui::TuiState;
use crate::tui::browser_session::BrowserSession;
use crate::tui::component::Component;
use crate::tui::components::{BrowserScreen, HomeScreen};

/// Draw one frame: the home screen, or the browser screen presented over it.
pub fn draw_ui<E: BrowserEngine + TextRendering>(
    frame: &mut Frame,
    app: &App,
    tui: &mut TuiState,
    session: Option<&mut BrowserSession<E>>,
    now: Instant,
    spinner_frame: usize,
) {
    let area = frame.area();

    let Some(session) = session else {
        HomeScreen::new(&mut tui.home, app).render(frame, area);
        return;
    };

    frame.render_widget(Clear, area);
    let address = session.address();
    let progress = session.progress.value_at(now);
    let BrowserSession {
        view, state, page, ..
    } = session;
    BrowserScreen {
        state,
        nav: view.state(),
        page: page.as_ref(),
        address: &address,
        chrome: tui.chrome,
        progress,
        spinner_frame,
    }
    .render(frame, area);
}

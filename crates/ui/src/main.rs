use gpui::*;
use gpui_component::Root;

use chatbot_core::AppConfig;
use chatbot_ui::app::{
    ChatAppShell, NewChat, Quit, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH, apply_theme,
};
use chatbot_ui::startup::{build_services, init_tracing};

fn main() {
    init_tracing();

    let config = AppConfig::load();
    let services = match build_services(&config) {
        Ok(services) => services,
        Err(error) => {
            tracing::error!("failed to start chatbot: {}", error);
            std::process::exit(1);
        }
    };

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        gpui_tokio_bridge::init(cx);
        // Must run before any Root is created.
        gpui_component::init(cx);
        apply_theme(config.theme, None, cx);

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("ctrl-q", Quit, None),
            KeyBinding::new("cmd-n", NewChat, None),
            KeyBinding::new("ctrl-n", NewChat, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(WINDOW_WIDTH), px(WINDOW_HEIGHT)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some(WINDOW_TITLE.into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| ChatAppShell::new(services, window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });

                match opened {
                    Ok(_) => cx.activate(true),
                    Err(error) => {
                        tracing::error!("failed to open main window: {}", error);
                        cx.quit();
                    }
                }
            })
        })
        .detach();
    });
}

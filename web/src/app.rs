use leptos::prelude::*;
use leptos::task::spawn_local;
use shared::protocol::{ResultRecord, ResultSubmission};
use shared::session::TIME_PRESETS_MS;
use shared::{RandomWords, Session, SessionConfig, SessionState, TickOutcome};
use std::cell::RefCell;

use crate::api;
use crate::game::{format_clock, Game, SessionView};
use crate::prefs;
use crate::scheduler::IntervalScheduler;

const LEADERBOARD_SIZE: usize = 50;

// Thread-local storage for the running game. The session holds browser timer
// handles, which are not Send/Sync and so cannot live inside signals or be
// captured by Leptos children closures.
thread_local! {
    static GAME: RefCell<Option<Game<IntervalScheduler>>> = const { RefCell::new(None) };
}

fn with_game<R>(f: impl FnOnce(&mut Game<IntervalScheduler>) -> R) -> Option<R> {
    GAME.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn snapshot() -> SessionView {
    with_game(|game| game.snapshot()).unwrap_or_default()
}

#[component]
pub fn App() -> impl IntoView {
    let (game_view, set_game_view) = signal(SessionView::default());
    let (dismissed, set_dismissed) = signal(false);
    let (name, set_name) = signal(String::new());
    let (usn, set_usn) = signal(String::new());
    let (submitted, set_submitted) = signal(false);
    let (submit_error, set_submit_error) = signal(None::<String>);
    let (show_board, set_show_board) = signal(false);
    let (board, set_board) = signal(Vec::<ResultRecord>::new());
    let (board_error, set_board_error) = signal(None::<String>);

    let refresh = move || set_game_view.set(snapshot());

    let scheduler = IntervalScheduler::new(move || {
        if let Some(TickOutcome::Expired(summary)) = with_game(|game| game.tick()) {
            web_sys::console::log_1(
                &format!("Time's up: {:.0} WPM, {:.0}% accuracy", summary.wpm, summary.accuracy)
                    .into(),
            );
        }
        set_game_view.set(snapshot());
    });
    let seed = js_sys::Date::now() as u64;
    let config = SessionConfig::with_duration_ms(prefs::load_duration_ms());
    match Session::new(config, scheduler, Box::new(RandomWords::new(seed))) {
        Ok(session) => GAME.with(|cell| *cell.borrow_mut() = Some(Game::new(session))),
        Err(e) => web_sys::console::error_1(&e.to_string().into()),
    }
    refresh();

    let reset_results = move || {
        set_dismissed.set(false);
        set_submitted.set(false);
        set_submit_error.set(None);
    };

    let restart = move || {
        with_game(|game| game.restart());
        reset_results();
        refresh();
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
            return;
        }
        let key = ev.key();
        let outcome = if key == "Backspace" {
            with_game(|game| game.backspace())
        } else {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => {
                    // keep space from scrolling the page
                    ev.prevent_default();
                    with_game(|game| game.submit(ch).map(|_| ()))
                }
                _ => return,
            }
        };
        if let Some(Err(e)) = outcome {
            web_sys::console::log_1(&format!("Keystroke ignored: {}", e).into());
        }
        refresh();
    };

    let load_board = move || {
        spawn_local(async move {
            match api::leaderboard(LEADERBOARD_SIZE).await {
                Ok(rows) => {
                    set_board.set(rows);
                    set_board_error.set(None);
                }
                Err(e) => set_board_error.set(Some(e.to_string())),
            }
        });
    };

    let submit = move |_: leptos::ev::MouseEvent| {
        let Some(summary) = game_view.get_untracked().result else {
            return;
        };
        let submission = ResultSubmission {
            name: name.get_untracked(),
            usn: usn.get_untracked(),
            results: summary.to_payload(),
        };
        set_submit_error.set(None);
        spawn_local(async move {
            match api::save_result(&submission).await {
                Ok(saved) => {
                    web_sys::console::log_1(
                        &format!("Results submitted successfully: {}", saved.result.id).into(),
                    );
                    set_submitted.set(true);
                }
                Err(e) => set_submit_error.set(Some(format!(
                    "Failed to submit results. Please try again. ({})",
                    e
                ))),
            }
        });
    };

    let result_card = |title: &'static str, value: String| {
        view! {
            <div class="result-card">
                <div class="result-title">{title}</div>
                <div class="result-value">{value}</div>
            </div>
        }
    };

    view! {
        <main class="container">
            <header class="header">
                <h1 class="logo" on:click=move |_| restart()>"typerace"</h1>
                <button
                    class="leaderboard-toggle"
                    on:click=move |_| {
                        let open = !show_board.get();
                        set_show_board.set(open);
                        if open {
                            load_board();
                        }
                    }
                >
                    "Leaderboard"
                </button>
            </header>

            <div class="time-category">
                {TIME_PRESETS_MS
                    .iter()
                    .map(|&ms| {
                        view! {
                            <button
                                class=move || {
                                    if game_view.get().duration_ms == ms {
                                        "time-option active"
                                    } else {
                                        "time-option"
                                    }
                                }
                                on:click=move |_| {
                                    match with_game(|game| game.set_duration(ms)) {
                                        Some(Err(e)) => {
                                            web_sys::console::error_1(&e.to_string().into())
                                        }
                                        Some(Ok(())) => prefs::save_duration_ms(ms),
                                        None => {}
                                    }
                                    reset_results();
                                    refresh();
                                }
                            >
                                {format!("{}s", ms / 1000)}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>

            <div class="countdown">{move || format_clock(game_view.get().remaining_secs)}</div>

            <div class="words" tabindex="0" on:keydown=on_keydown>
                {move || {
                    game_view
                        .get()
                        .words
                        .into_iter()
                        .map(|word| {
                            let class = if word.active { "word active" } else { "word" };
                            view! {
                                <span class=class>
                                    {word
                                        .chars
                                        .into_iter()
                                        .map(|c| view! { <span class={c.class.css()}>{c.ch.to_string()}</span> })
                                        .collect_view()}
                                </span>
                                " "
                            }
                        })
                        .collect_view()
                }}
            </div>
            <Show when=move || game_view.get().state == SessionState::Idle>
                <p class="hint">"Click the words and start typing."</p>
            </Show>

            <button class="restart" on:click=move |_| restart()>"Restart"</button>

            <Show when=move || game_view.get().result.is_some() && !dismissed.get()>
                <div class="modal">
                    <div class="modal-content">
                        <div class="modal-header">
                            <h2>"test results"</h2>
                            <button on:click=move |_| set_dismissed.set(true)>"close"</button>
                        </div>
                        {move || {
                            let v = game_view.get();
                            v.result
                                .map(|r| {
                                    view! {
                                        <div class="result-grid">
                                            {result_card("wpm/cpm", format!("{:.0} / {:.0}", r.wpm, r.cpm))}
                                            {result_card("acc.", format!("{:.0}%", r.accuracy))}
                                            {result_card(
                                                "character",
                                                format!("{} / {}", v.correct_chars, v.incorrect_chars),
                                            )}
                                            {result_card("err.", format!("{:.0}%", r.error_rate))}
                                            {result_card("time", format!("{}s", r.total_time_ms / 1000))}
                                            {result_card("total", r.total_characters.to_string())}
                                        </div>
                                    }
                                })
                        }}
                        <Show
                            when=move || !submitted.get()
                            fallback=|| {
                                view! {
                                    <p class="thanks">"Thank you for submitting your results!"</p>
                                }
                            }
                        >
                            <div class="submit-form">
                                <h2>"Submit Your Details"</h2>
                                <label>"Name:"</label>
                                <input
                                    type="text"
                                    prop:value=name
                                    on:input=move |ev| set_name.set(event_target_value(&ev))
                                />
                                <label>"USN:"</label>
                                <input
                                    type="text"
                                    prop:value=usn
                                    on:input=move |ev| set_usn.set(event_target_value(&ev))
                                />
                                {move || submit_error.get().map(|e| view! { <p class="error">{e}</p> })}
                                <button on:click=submit>"Submit"</button>
                            </div>
                        </Show>
                    </div>
                </div>
            </Show>

            <Show when=move || show_board.get()>
                <div class="modal">
                    <div class="modal-content">
                        <div class="modal-header">
                            <h2>"Leaderboard"</h2>
                            <button on:click=move |_| load_board()>"refresh"</button>
                            <button on:click=move |_| set_show_board.set(false)>"close"</button>
                        </div>
                        {move || board_error.get().map(|e| view! { <p class="error">{e}</p> })}
                        <table class="leaderboard">
                            <thead>
                                <tr>
                                    <th>"#"</th>
                                    <th>"Name"</th>
                                    <th>"USN"</th>
                                    <th>"WPM"</th>
                                    <th>"Accuracy"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {move || {
                                    board
                                        .get()
                                        .into_iter()
                                        .enumerate()
                                        .map(|(i, r)| {
                                            view! {
                                                <tr>
                                                    <td>{i + 1}</td>
                                                    <td>{r.name}</td>
                                                    <td>{r.usn}</td>
                                                    <td>{format!("{:.0}", r.results.wpm)}</td>
                                                    <td>{format!("{:.0}%", r.results.accuracy)}</td>
                                                </tr>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </tbody>
                        </table>
                    </div>
                </div>
            </Show>
        </main>
    }
}

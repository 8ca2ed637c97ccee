//! Built-in routines the engine is seeded with at startup.

use astral_domain::id::RoutineId;
use astral_domain::routine::{Action, Routine, Trigger};
use astral_domain::time::{self, ScheduleTime};
use chrono::NaiveTime;

fn routine(
    id: &str,
    name: &str,
    description: &str,
    trigger: Trigger,
    actions: Vec<Action>,
) -> Routine {
    Routine {
        id: RoutineId::from(id),
        name: name.to_string(),
        description: description.to_string(),
        enabled: true,
        trigger,
        actions,
        created_at: time::now(),
        last_run: None,
    }
}

fn at(hour: u32, minute: u32) -> Trigger {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
    Trigger::Scheduled {
        time: ScheduleTime::from(time),
    }
}

fn voice(phrases: &[&str]) -> Trigger {
    Trigger::VoiceCommand {
        phrases: phrases.iter().map(ToString::to_string).collect(),
    }
}

fn speak(text: &str) -> Action {
    Action::Speak {
        text: text.to_string(),
    }
}

fn launch(app_name: &str) -> Action {
    Action::LaunchApp {
        app_name: app_name.to_string(),
    }
}

fn notify(title: &str, message: &str) -> Action {
    Action::SendNotification {
        title: title.to_string(),
        message: message.to_string(),
    }
}

/// The default catalog: morning, work, evening and gaming routines.
#[must_use]
pub fn default_routines() -> Vec<Routine> {
    vec![
        routine(
            "morning-routine",
            "Morning Routine",
            "Start your day with news, calendar, and music",
            at(8, 0),
            vec![
                speak("Good morning! Starting your morning routine."),
                Action::SetVolume { level: 50 },
                launch("Calendar"),
                Action::Wait { seconds: 2 },
                Action::OpenWebsite {
                    url: "https://news.google.com".to_string(),
                },
                notify("Morning Routine", "Your morning routine is complete!"),
            ],
        ),
        routine(
            "work-mode",
            "Work Mode",
            "Focus mode with productivity apps",
            voice(&["start work mode"]),
            vec![
                speak("Activating work mode. Let's be productive!"),
                launch("Code"),
                launch("Teams"),
                Action::SetVolume { level: 30 },
                notify("Work Mode", "Work mode activated. Focus time!"),
            ],
        ),
        routine(
            "evening-winddown",
            "Evening Wind Down",
            "Relax and prepare for tomorrow",
            at(20, 0),
            vec![
                speak("Good evening! Time to wind down."),
                Action::SetVolume { level: 40 },
                Action::OpenWebsite {
                    url: "https://open.spotify.com".to_string(),
                },
                notify("Evening Routine", "Time to relax and recharge!"),
            ],
        ),
        routine(
            "gaming-mode",
            "Gaming Mode",
            "Optimize system for gaming",
            voice(&["start gaming mode"]),
            vec![
                speak("Activating gaming mode. Good luck and have fun!"),
                Action::SetVolume { level: 80 },
                notify("Gaming Mode", "System optimized for gaming!"),
            ],
        ),
    ]
}

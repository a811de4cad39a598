//! Builds the declarative scene for one frame from a session snapshot.

use carnival_core::{JumpscareCause, ScreenState, NIGHT_LENGTH};
use carnival_presentation::{CameraView, Hud, OfficeView, Scene, ScreenView};
use carnival_session::query::SessionSnapshot;

/// Maps one snapshot to the scene a backend should draw.
pub(crate) fn build_scene(snapshot: &SessionSnapshot) -> Scene {
    let view = match snapshot.screen {
        ScreenState::Menu => ScreenView::Menu {
            continue_available: snapshot.saved_night > 1,
        },
        ScreenState::Playing => playing_view(snapshot),
        ScreenState::PowerOut => ScreenView::PowerOut,
        ScreenState::Jumpscare => ScreenView::Jumpscare {
            cause: snapshot.jumpscare_cause.unwrap_or(JumpscareCause::Crowman),
        },
        ScreenState::GameOver => ScreenView::GameOver {
            message: snapshot.game_over_message.unwrap_or("It got you."),
        },
        ScreenState::WinNight => ScreenView::WinNight {
            next_night: snapshot.night.saturating_add(1),
        },
        ScreenState::WinGame => ScreenView::WinGame,
        ScreenState::FinalJumpscare => ScreenView::FinalJumpscare,
        ScreenState::End => ScreenView::End,
    };

    let hud = (snapshot.screen == ScreenState::Playing).then(|| {
        let remaining = snapshot.time_remaining.as_secs();
        Hud {
            minutes: remaining / 60,
            seconds: remaining % 60,
            power_percent: snapshot.power.get(),
            night: snapshot.night,
        }
    });

    Scene {
        view,
        hud,
        phone_call_active: snapshot.phone_call_active,
    }
}

fn playing_view(snapshot: &SessionSnapshot) -> ScreenView {
    if snapshot.showing_cameras {
        ScreenView::Cameras(CameraView {
            selected: snapshot.selected_camera,
            blocked_cameras: snapshot.blocked_cameras.clone(),
            tilly_camera: snapshot.tilly_camera,
            dizzy_camera: snapshot.dizzy_camera,
            left_door_closed: snapshot.left_door_closed,
            right_door_closed: snapshot.right_door_closed,
            screech_ready: snapshot.screech_ready,
        })
    } else {
        ScreenView::Office(OfficeView {
            left_door_closed: snapshot.left_door_closed,
            right_door_closed: snapshot.right_door_closed,
            right_door_broken: snapshot.right_door_broken,
            balloona_head: snapshot.balloona_head,
            night_elapsed: NIGHT_LENGTH.saturating_sub(snapshot.time_remaining),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carnival_core::{CameraId, NightTable, Power};
    use std::time::Duration;

    fn base_snapshot() -> SessionSnapshot {
        let session = carnival_session::Session::new(1, NightTable::default());
        carnival_session::query::snapshot(&session)
    }

    #[test]
    fn menu_scene_reflects_saved_progress() {
        let snapshot = base_snapshot();
        let scene = build_scene(&snapshot);
        assert_eq!(
            scene.view,
            ScreenView::Menu {
                continue_available: false,
            }
        );
        assert!(scene.hud.is_none());
    }

    #[test]
    fn playing_scene_carries_the_hud_and_view_mode() {
        let mut snapshot = base_snapshot();
        snapshot.screen = ScreenState::Playing;
        snapshot.night = 3;
        snapshot.power = Power::new(87.3);
        snapshot.time_remaining = Duration::from_secs(4 * 60 + 7);

        let scene = build_scene(&snapshot);
        let hud = scene.hud.expect("playing shows the hud");
        assert_eq!(hud.minutes, 4);
        assert_eq!(hud.seconds, 7);
        assert_eq!(hud.night, 3);
        assert!(matches!(scene.view, ScreenView::Office(_)));

        snapshot.showing_cameras = true;
        snapshot.selected_camera = Some(CameraId::new(2));
        let scene = build_scene(&snapshot);
        match scene.view {
            ScreenView::Cameras(view) => assert_eq!(view.selected, Some(CameraId::new(2))),
            other => panic!("expected the camera rig, got {other:?}"),
        }
    }
}

//! Matrix operations against a scripted unit.

use std::sync::Arc;

use hd41_matrix::{
    Action, Edid, Feature, MatrixError, MatrixInterface, PollGroups, Port, Source, Switch,
    SwitchBoard,
};
use hd41_transport::testing::{corrupted, reply_to, Reply, ScriptedTransport};
use hd41_transport::{Command, FlowControlTransport, TransportError};

fn matrix(replies: impl IntoIterator<Item = Reply>) -> (Arc<ScriptedTransport>, MatrixInterface) {
    let script = Arc::new(ScriptedTransport::with_replies(replies));
    let flow = Arc::new(FlowControlTransport::new(script.clone()));
    (script, MatrixInterface::new(flow))
}

#[tokio::test(start_paused = true)]
async fn get_source_decodes_input() {
    let (script, hd41) = matrix([Reply::Frame(reply_to(Command::GetSource, 0x00, 0x01))]);

    assert_eq!(hd41.get_source().await.unwrap(), Source::Input1);
    assert_eq!(script.written_commands(), vec![Some(Command::GetSource)]);
}

#[tokio::test(start_paused = true)]
async fn get_source_out_of_range_is_decode_failure() {
    let (script, hd41) = matrix([Reply::Frame(reply_to(Command::GetSource, 0x00, 0x05))]);

    let err = hd41.get_source().await.unwrap_err();
    assert!(err.is_decode_failure(), "{err}");
    // a checksum-valid reply is never retried
    assert_eq!(script.written().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn get_edid_decodes_profile() {
    let (_script, hd41) = matrix([
        Reply::Frame(reply_to(Command::GetEdid, 0x00, 0x03)),
        Reply::Frame(reply_to(Command::GetEdid, 0x00, 0x00)),
    ]);

    assert_eq!(hd41.get_edid().await.unwrap(), Edid::DolbyDts);
    assert!(hd41.get_edid().await.unwrap_err().is_decode_failure());
}

#[tokio::test(start_paused = true)]
async fn get_arc_decodes_param_byte() {
    let (_script, hd41) = matrix([
        Reply::Frame(reply_to(Command::GetArc, 0x0F, 0x00)),
        Reply::Frame(reply_to(Command::GetArc, 0xF0, 0x00)),
        Reply::Frame(reply_to(Command::GetArc, 0x3C, 0x00)),
    ]);

    assert!(hd41.get_arc().await.unwrap());
    assert!(!hd41.get_arc().await.unwrap());
    assert!(matches!(
        hd41.get_arc().await,
        Err(MatrixError::Decode(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn get_auto_uses_auto_query() {
    let (script, hd41) = matrix([Reply::Frame(reply_to(Command::GetAuto, 0xF0, 0x00))]);

    assert!(!hd41.get_auto().await.unwrap());
    assert_eq!(script.written_commands(), vec![Some(Command::GetAuto)]);
}

#[tokio::test(start_paused = true)]
async fn port_connection_state() {
    let (script, hd41) = matrix([
        Reply::Frame(reply_to(Command::IsOutputConnected, 0x00, 0x00)),
        Reply::Frame(reply_to(Command::IsInput3Connected, 0x00, 0xFF)),
        Reply::Frame(reply_to(Command::IsInput1Connected, 0x00, 0x7E)),
    ]);

    assert!(hd41.is_port_connected(Port::Output).await.unwrap());
    assert!(!hd41.is_port_connected(Port::Input3).await.unwrap());
    assert!(hd41
        .is_port_connected(Port::Input1)
        .await
        .unwrap_err()
        .is_decode_failure());
    assert_eq!(
        script.written_commands(),
        vec![
            Some(Command::IsOutputConnected),
            Some(Command::IsInput3Connected),
            Some(Command::IsInput1Connected),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn corrupted_replies_are_retried() {
    let good = reply_to(Command::GetSource, 0x00, 0x02);
    let (script, hd41) = matrix([
        Reply::Frame(corrupted(good)),
        Reply::Frame(corrupted(good)),
        Reply::Frame(good),
    ]);

    assert_eq!(hd41.get_source().await.unwrap(), Source::Input2);
    assert_eq!(script.written().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn silent_unit_is_transport_failure() {
    let (script, hd41) = matrix([]);

    let err = hd41.get_arc().await.unwrap_err();
    assert!(err.is_transport_failure());
    assert!(matches!(
        err,
        MatrixError::Transport(TransportError::NoResponse {
            command: Command::GetArc,
            attempts: 3
        })
    ));
    assert_eq!(script.written().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn setters_send_catalog_frames() {
    let ack = |cmd: Command| Reply::Frame(reply_to(cmd, 0x00, 0x00));
    let (script, hd41) = matrix([
        ack(Command::SetSourceInput4),
        ack(Command::SetEdidStereo),
        ack(Command::EnableArc),
        ack(Command::DisableAuto),
    ]);

    hd41.set_source(Source::Input4).await.unwrap();
    hd41.set_edid(Edid::Stereo).await.unwrap();
    hd41.set_arc(true).await.unwrap();
    hd41.set_auto(false).await.unwrap();

    assert_eq!(
        script.written(),
        vec![
            Command::SetSourceInput4.frame().to_vec(),
            Command::SetEdidStereo.frame().to_vec(),
            Command::EnableArc.frame().to_vec(),
            Command::DisableAuto.frame().to_vec(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn setter_without_ack_fails() {
    let (script, hd41) = matrix([]);
    assert!(hd41.set_source(Source::Input1).await.is_err());

    // unit comes back
    script.push_reply(Reply::Frame(reply_to(Command::SetSourceInput1, 0, 0)));
    hd41.set_source(Source::Input1).await.unwrap();
    assert_eq!(script.remaining_replies(), 0);
    assert_eq!(script.written().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn set_source_number_validates_range() {
    let (script, hd41) = matrix([Reply::Frame(reply_to(Command::SetSourceInput2, 0, 0))]);

    assert!(matches!(
        hd41.set_source_number(0).await,
        Err(MatrixError::InvalidParameter(_))
    ));
    assert!(hd41.set_source_number(5).await.is_err());
    assert!(script.written().is_empty());

    hd41.set_source_number(2).await.unwrap();
    assert_eq!(script.written_commands(), vec![Some(Command::SetSourceInput2)]);
}

#[tokio::test(start_paused = true)]
async fn poll_queries_only_enabled_groups() {
    let (script, hd41) = matrix([
        Reply::Frame(reply_to(Command::GetArc, 0x0F, 0x00)),
        Reply::Frame(reply_to(Command::GetSource, 0x00, 0x03)),
        Reply::Frame(reply_to(Command::IsOutputConnected, 0x00, 0x00)),
    ]);
    let groups = PollGroups {
        input: true,
        audio: false,
        auto_switch: false,
        arc: true,
        connections: vec![Port::Output],
    };

    let status = hd41.poll(&groups).await;
    assert_eq!(status.arc, Some(true));
    assert_eq!(status.source, Some(Source::Input3));
    assert_eq!(status.edid, None);
    assert_eq!(status.auto_switch, None);
    assert_eq!(status.connection(Port::Output), Some(true));
    assert_eq!(script.written().len(), groups.query_count());
}

#[tokio::test(start_paused = true)]
async fn poll_failure_leaves_field_empty() {
    let (_script, hd41) = matrix([
        Reply::Frame(reply_to(Command::GetArc, 0x3C, 0x00)),
        Reply::Frame(reply_to(Command::GetAuto, 0x0F, 0x00)),
        Reply::Frame(reply_to(Command::GetSource, 0x00, 0x01)),
        Reply::Frame(reply_to(Command::GetEdid, 0x00, 0x09)),
    ]);

    let status = hd41.poll(&PollGroups::all().switches()).await;
    assert_eq!(status.arc, None);
    assert_eq!(status.auto_switch, Some(true));
    assert_eq!(status.source, Some(Source::Input1));
    assert_eq!(status.edid, None);
}

#[tokio::test(start_paused = true)]
async fn switch_board_round_trip() {
    let (script, hd41) = matrix([
        Reply::Frame(reply_to(Command::SetSourceInput2, 0x00, 0x00)),
        Reply::Frame(reply_to(Command::GetSource, 0x00, 0x04)),
    ]);
    let mut board = SwitchBoard::new();

    let action = board.toggle(Switch::Input(Source::Input2), true).unwrap();
    assert_eq!(action, Action::SetSource(Source::Input2));
    hd41.apply(action).await.unwrap();

    // someone pressed the front-panel button meanwhile
    let groups = PollGroups {
        input: true,
        ..PollGroups::none()
    };
    let status = hd41.poll(&groups).await;
    let changed = board.apply_status(&status);
    assert_eq!(
        changed,
        vec![
            (Switch::Input(Source::Input2), false),
            (Switch::Input(Source::Input4), true),
        ]
    );

    // mirroring state sends nothing
    assert_eq!(
        script.written_commands(),
        vec![Some(Command::SetSourceInput2), Some(Command::GetSource)]
    );
}

#[tokio::test(start_paused = true)]
async fn apply_feature_action() {
    let (script, hd41) = matrix([Reply::Frame(reply_to(Command::EnableAuto, 0, 0))]);

    hd41.apply(Action::SetFeature(Feature::AutoSwitch, true))
        .await
        .unwrap();
    assert_eq!(script.written_commands(), vec![Some(Command::EnableAuto)]);
}

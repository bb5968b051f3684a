//! End-to-end membership tracking through the dispatch chain: JOIN and
//! PART replay, names-list assembly, mode changes, and tag caching.

mod common;

use common::connected_pair;

use tmi_proto::Message;
use tmibot::DispatchChain;

async fn dispatch(
    conn: &mut tmibot::Connection<tokio::io::DuplexStream>,
    chain: &mut DispatchChain<tokio::io::DuplexStream>,
    line: &str,
) -> bool {
    let msg: Message = line.parse().expect("test line parses");
    chain.handle_message(conn, &msg).await
}

#[tokio::test]
async fn join_and_part_maintain_the_user_list() {
    let (mut conn, mut server) = connected_pair();
    let mut chain = DispatchChain::new(vec![]);
    conn.join_channel("#chan").await.unwrap();
    assert_eq!(server.expect_line().await, "JOIN #chan");
    assert_eq!(server.expect_line().await, "MODE #chan");

    dispatch(&mut conn, &mut chain, ":alice!alice@host JOIN #chan").await;
    assert!(conn.user_list().contains_key("alice"));

    // A duplicate JOIN is rejected and changes nothing.
    dispatch(&mut conn, &mut chain, ":alice!alice@host JOIN #chan").await;
    assert_eq!(conn.user_list().len(), 1);

    // PART for someone never seen is rejected.
    dispatch(&mut conn, &mut chain, ":bob!bob@host PART #chan").await;
    assert_eq!(conn.user_list().len(), 1);

    dispatch(&mut conn, &mut chain, ":alice!alice@host PART #chan").await;
    assert!(conn.user_list().is_empty());
}

#[tokio::test]
async fn join_for_another_channel_is_ignored() {
    let (mut conn, _server) = connected_pair();
    let mut chain = DispatchChain::new(vec![]);
    conn.join_channel("#chan").await.unwrap();

    dispatch(&mut conn, &mut chain, ":alice!alice@host JOIN #other").await;
    assert!(conn.user_list().is_empty());
}

#[tokio::test]
async fn names_replies_accumulate_and_replace_on_end() {
    let (mut conn, _server) = connected_pair();
    let mut chain = DispatchChain::new(vec![]);
    conn.join_channel("#chan").await.unwrap();

    // Seed a user with state that must survive the replacement.
    dispatch(&mut conn, &mut chain, ":alice!alice@host JOIN #chan").await;
    dispatch(&mut conn, &mut chain, ":jtv MODE #chan +o alice").await;
    assert!(conn.user_list()["alice"].has_mode('o'));

    dispatch(
        &mut conn,
        &mut chain,
        ":bot.tmi.twitch.tv 353 bot = #chan :@alice bob",
    )
    .await;
    dispatch(
        &mut conn,
        &mut chain,
        ":bot.tmi.twitch.tv 353 bot = #chan :+carol",
    )
    .await;
    // Nothing is committed until the end-of-names marker.
    assert_eq!(conn.user_list().len(), 1);

    dispatch(
        &mut conn,
        &mut chain,
        ":bot.tmi.twitch.tv 366 bot #chan :End of /NAMES list",
    )
    .await;

    let users = conn.user_list();
    assert_eq!(users.len(), 3);
    // Membership prefixes were stripped from the names.
    assert!(users.contains_key("alice"));
    assert!(users.contains_key("bob"));
    assert!(users.contains_key("carol"));
    // alice kept her accumulated state.
    assert!(users["alice"].has_mode('o'));
}

#[tokio::test]
async fn end_of_names_without_names_reply_changes_nothing() {
    let (mut conn, _server) = connected_pair();
    let mut chain = DispatchChain::new(vec![]);
    conn.join_channel("#chan").await.unwrap();
    dispatch(&mut conn, &mut chain, ":alice!alice@host JOIN #chan").await;

    dispatch(
        &mut conn,
        &mut chain,
        ":bot.tmi.twitch.tv 366 bot #chan :End of /NAMES list",
    )
    .await;

    assert_eq!(conn.user_list().len(), 1);
    assert!(conn.user_list().contains_key("alice"));
}

#[tokio::test]
async fn malformed_names_reply_contributes_no_names() {
    let (mut conn, _server) = connected_pair();
    let mut chain = DispatchChain::new(vec![]);
    conn.join_channel("#chan").await.unwrap();

    // Wrong channel in the header: rejected.
    dispatch(
        &mut conn,
        &mut chain,
        ":bot.tmi.twitch.tv 353 bot = #other :mallory",
    )
    .await;
    // A good reply still works afterwards.
    dispatch(
        &mut conn,
        &mut chain,
        ":bot.tmi.twitch.tv 353 bot = #chan :alice",
    )
    .await;
    dispatch(
        &mut conn,
        &mut chain,
        ":bot.tmi.twitch.tv 366 bot #chan :End of /NAMES list",
    )
    .await;

    let users = conn.user_list();
    assert_eq!(users.len(), 1);
    assert!(users.contains_key("alice"));
}

#[tokio::test]
async fn mode_changes_require_the_server_sender() {
    let (mut conn, _server) = connected_pair();
    let mut chain = DispatchChain::new(vec![]);
    conn.join_channel("#chan").await.unwrap();
    dispatch(&mut conn, &mut chain, ":alice!alice@host JOIN #chan").await;

    // Only "jtv" may change modes.
    dispatch(&mut conn, &mut chain, ":mallory MODE #chan +o alice").await;
    assert!(!conn.user_list()["alice"].has_mode('o'));

    dispatch(&mut conn, &mut chain, ":jtv MODE #chan +o alice").await;
    assert!(conn.user_list()["alice"].has_mode('o'));

    // Setting an already-set mode is rejected, the flag stays set.
    dispatch(&mut conn, &mut chain, ":jtv MODE #chan +o alice").await;
    assert!(conn.user_list()["alice"].has_mode('o'));

    dispatch(&mut conn, &mut chain, ":jtv MODE #chan -o alice").await;
    assert!(!conn.user_list()["alice"].has_mode('o'));
}

#[tokio::test]
async fn mode_for_unknown_user_is_ignored() {
    let (mut conn, _server) = connected_pair();
    let mut chain = DispatchChain::new(vec![]);
    conn.join_channel("#chan").await.unwrap();

    dispatch(&mut conn, &mut chain, ":jtv MODE #chan +o ghost").await;
    assert!(conn.user_list().is_empty());
}

#[tokio::test]
async fn tagged_privmsg_caches_tags_on_the_sender() {
    let (mut conn, mut server) = connected_pair();
    let mut chain = DispatchChain::new(vec![]);
    conn.join_channel("#chan").await.unwrap();
    let _ = server.expect_line().await;
    let _ = server.expect_line().await;

    // The sender is unknown: a user entry is created for them.
    let handled = dispatch(
        &mut conn,
        &mut chain,
        "@mod=1;color=#FF0000 :alice!alice@host PRIVMSG #chan :hello",
    )
    .await;
    // Tag caching never consumes the message.
    assert!(!handled);

    let alice = &conn.user_list()["alice"];
    assert_eq!(alice.tag("mod"), Some("1"));
    assert_eq!(alice.tag("color"), Some("#FF0000"));
    assert!(alice.is_moderator());

    // Later tags merge over earlier ones.
    dispatch(
        &mut conn,
        &mut chain,
        "@color=#00FF00 :alice!alice@host PRIVMSG #chan :again",
    )
    .await;
    let alice = &conn.user_list()["alice"];
    assert_eq!(alice.tag("color"), Some("#00FF00"));
    assert_eq!(alice.tag("mod"), Some("1"));
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let (mut conn, mut server) = connected_pair();
    let mut chain = DispatchChain::new(vec![]);

    let handled = dispatch(&mut conn, &mut chain, "PING :tmi.twitch.tv").await;
    assert!(handled);
    assert_eq!(server.expect_line().await, "PONG :tmi.twitch.tv");
}

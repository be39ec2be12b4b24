use gemini_studio::{
    ai::{MockChatClient, MockContentClient, MockSpeechClient, PromptPart},
    media,
    playback::{MockAudioPlayer, WavPlayer},
    story::{ContinueOutcome, ReadAloudOutcome, StorySession},
    studio::{Studio, StudioServices},
    Error,
};
use std::fs;
use std::path::{Path, PathBuf};

fn studio_with(
    chat: &MockChatClient,
    content: &MockContentClient,
    speech: &MockSpeechClient,
) -> Studio {
    Studio::with_services(StudioServices {
        chat: Box::new(chat.clone()),
        content: Box::new(content.clone()),
        speech: Box::new(speech.clone()),
    })
}

fn write_fake_image(dir: &Path, name: &str, magic: &[u8], size: usize) -> PathBuf {
    let mut bytes = magic.to_vec();
    bytes.resize(size, 0xAB);
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn test_story_workflow_with_mocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fake_image(
        dir.path(),
        "harbor.jpg",
        &[0xFF, 0xD8, 0xFF, 0xE0],
        2 * 1000 * 1000,
    );

    let image = media::load_image(&path).await.unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert!(!image.data.starts_with("data:"));
    assert!(!image.data.contains(','));

    let content = MockContentClient::new()
        .with_structured_response(
            serde_json::json!({
                "story": "Fog swallowed the harbor.",
                "prompts": ["Who rang the bell?", "What did the tide leave?", "Where is the ferry?"]
            })
            .to_string(),
        )
        .with_text_response("A lantern swung on the empty pier.".to_string());
    let speech = MockSpeechClient::new();
    let studio = studio_with(&MockChatClient::new(), &content, &speech);
    let session = StorySession::new();

    // Generate
    let state = session
        .generate(&studio, image.clone(), "Mystery", "Minimalist")
        .await
        .unwrap();
    assert_eq!(state.story, "Fog swallowed the harbor.");
    assert!((3..=5).contains(&state.inspiration_prompts.len()));

    // Continue
    let outcome = session.continue_story(&studio).await.unwrap();
    assert_eq!(
        outcome,
        ContinueOutcome::Appended("A lantern swung on the empty pier.".to_string())
    );
    let state = session.state().await.unwrap();
    assert_eq!(
        state.story,
        "Fog swallowed the harbor.\n\nA lantern swung on the empty pier."
    );

    // The continuation re-sent the original image and the story so far.
    let continuation_request = &content.requests()[1];
    assert_eq!(continuation_request[0], PromptPart::Image(image));

    // Read aloud
    let player = MockAudioPlayer::new();
    let outcome = session.read_aloud(&studio, &player).await.unwrap();
    assert_eq!(outcome, ReadAloudOutcome::Played);
    assert_eq!(player.get_play_count(), 1);
    assert!(speech.prompts()[0].0.ends_with(&state.story));
}

#[tokio::test]
async fn test_oversize_image_is_rejected_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fake_image(
        dir.path(),
        "poster.png",
        &[0x89, 0x50, 0x4E, 0x47],
        5 * 1024 * 1024,
    );

    let content = MockContentClient::new();
    let studio = studio_with(&MockChatClient::new(), &content, &MockSpeechClient::new());

    let loaded = media::load_image(&path).await;
    if let Ok(image) = &loaded {
        studio.analyze_image("Describe this image in detail.", image).await;
    }

    assert!(matches!(loaded, Err(Error::ImageTooLarge { .. })));
    assert_eq!(content.get_call_count(), 0);
}

#[tokio::test]
async fn test_chat_turns_share_one_session() {
    let chat = MockChatClient::new();
    let studio = studio_with(&chat, &MockContentClient::new(), &MockSpeechClient::new());

    for message in ["Hello", "What's the weather like on Mars?", "Thanks!"] {
        let reply = studio.send_chat_turn(message).await;
        assert!(reply.contains(message));
    }

    assert_eq!(chat.sessions_created(), 1);
    assert_eq!(chat.send_count(), 3);
}

#[tokio::test]
async fn test_continuation_never_repeats_last_paragraph() {
    let content = MockContentClient::new().with_text_response(
        "The door closed behind her.\n\nSomewhere below, water dripped.".to_string(),
    );
    let studio = studio_with(&MockChatClient::new(), &content, &MockSpeechClient::new());

    let image = media::encode_image(&[0x89, 0x50, 0x4E, 0x47], "image/png");
    let prior = "She stepped inside.\n\nThe door closed behind her.";
    let next = studio.continue_story(prior, &image, "Horror", "Gothic").await;

    assert!(!next.contains("The door closed behind her."));
    let combined = format!("{}\n\n{}", prior, next);
    assert_eq!(combined.matches("The door closed behind her.").count(), 1);
}

#[tokio::test]
async fn test_speech_absent_paths_are_not_errors() {
    let studio = studio_with(
        &MockChatClient::new(),
        &MockContentClient::new(),
        &MockSpeechClient::new().with_audio(None),
    );
    assert!(studio.synthesize_speech("Once upon a time.").await.is_none());

    let studio = studio_with(
        &MockChatClient::new(),
        &MockContentClient::new(),
        &MockSpeechClient::new().with_failure(true),
    );
    assert!(studio.synthesize_speech("Once upon a time.").await.is_none());
}

#[tokio::test]
async fn test_narration_written_as_wav_file() {
    let dir = tempfile::tempdir().unwrap();
    let studio = studio_with(
        &MockChatClient::new(),
        &MockContentClient::new(),
        &MockSpeechClient::new(),
    );
    let session = StorySession::new();
    let image = media::encode_image(&[0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg");
    session
        .generate(&studio, image, "Fantasy", "Lyrical")
        .await
        .unwrap();

    let player = WavPlayer::new(dir.path());
    let outcome = session.read_aloud(&studio, &player).await.unwrap();
    assert_eq!(outcome, ReadAloudOutcome::Played);

    let wav_files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "wav"))
        .collect();
    assert_eq!(wav_files.len(), 1);
}

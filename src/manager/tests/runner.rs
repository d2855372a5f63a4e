use super::*;
use crate::manager::test_helpers::FetchBehavior;

fn selection(format_id: &str, audio_only: bool) -> FormatSelection {
    FormatSelection {
        format_id: format_id.to_string(),
        audio_only,
    }
}

#[tokio::test]
async fn best_sentinel_resolves_to_a_clean_expression() {
    let (downloader, fetcher, _temp_dir) = create_test_downloader().await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();
    wait_for_terminal(&downloader, id).await;

    let (url, plan) = fetcher.last_plan().await;
    assert_eq!(url, TEST_URL);
    assert_eq!(plan.format_expression, "bestvideo+bestaudio/best");
    assert!(
        !plan.format_expression.contains("best+"),
        "the sentinel must never be concatenated into a combined expression"
    );
}

#[tokio::test]
async fn specific_format_requests_merge_into_the_configured_container() {
    let (downloader, fetcher, _temp_dir) = create_test_downloader().await;

    let id = downloader
        .enqueue(TEST_URL, selection("137", false))
        .await
        .unwrap();
    wait_for_terminal(&downloader, id).await;

    let (_, plan) = fetcher.last_plan().await;
    assert_eq!(plan.format_expression, "137+bestaudio/best");
    assert_eq!(plan.merge_container.as_deref(), Some("mp4"));
    assert!(plan.audio_postprocess.is_none());
}

#[tokio::test]
async fn audio_only_requests_the_fixed_transcode_target() {
    let temp_dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::succeeding("Test Video.mp3");
    let downloader = downloader_with_config(test_config(temp_dir.path()), fetcher.clone()).await;

    let id = downloader
        .enqueue(TEST_URL, selection("137", true))
        .await
        .unwrap();
    wait_for_terminal(&downloader, id).await;

    let (_, plan) = fetcher.last_plan().await;
    assert_eq!(plan.format_expression, "bestaudio/best");
    let audio = plan.audio_postprocess.expect("audio jobs must transcode");
    assert_eq!(audio.codec, "mp3");
    assert_eq!(audio.quality, "192K");
    assert!(plan.merge_container.is_none());

    // The artifact extension reflects the transcode target
    let record = downloader.store.get(id).await.unwrap();
    assert!(
        record.artifact_name.unwrap().ends_with(".mp3"),
        "audio-only artifacts carry the target codec extension"
    );
}

#[tokio::test]
async fn plan_output_dir_is_the_jobs_exclusive_workdir() {
    let (downloader, fetcher, _temp_dir) = create_test_downloader().await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();
    wait_for_terminal(&downloader, id).await;

    let (_, plan) = fetcher.last_plan().await;
    assert_eq!(plan.output_dir, downloader.config.job_dir(id));
}

#[tokio::test]
async fn network_overrides_flow_into_the_plan() {
    let temp_dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::succeeding("Test Video.mp4");
    let mut config = test_config(temp_dir.path());
    config.network.user_agent = Some("test-agent/1.0".to_string());
    config.network.cookie_file = Some(temp_dir.path().join("cookies.txt"));
    config.network.source_address = Some("10.0.0.2".parse().unwrap());
    let downloader = downloader_with_config(config, fetcher.clone()).await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();
    wait_for_terminal(&downloader, id).await;

    let (_, plan) = fetcher.last_plan().await;
    assert_eq!(plan.user_agent.as_deref(), Some("test-agent/1.0"));
    assert_eq!(plan.cookie_file, Some(temp_dir.path().join("cookies.txt")));
    assert_eq!(plan.source_address, Some("10.0.0.2".parse().unwrap()));
}

#[tokio::test]
async fn progress_samples_surface_to_pollers_before_completion() {
    let temp_dir = tempfile::tempdir().unwrap();
    let gate = Arc::new(Notify::new());
    let fetcher = MockFetcher::with_progress(
        FetchBehavior::Block {
            gate: gate.clone(),
            filename: "Partial.mp4".to_string(),
        },
        vec![
            FetchProgress::Bytes {
                downloaded: 25,
                total: Some(100),
            },
            FetchProgress::Bytes {
                downloaded: 50,
                total: Some(100),
            },
        ],
    );
    let downloader = downloader_with_config(test_config(temp_dir.path()), fetcher).await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();

    let d = downloader.clone();
    wait_until("progress to reach 50", || {
        let d = d.clone();
        async move {
            d.query(id)
                .await
                .map(|i| i.progress == 50.0 && i.status == Status::Processing)
                .unwrap_or(false)
        }
    })
    .await;

    gate.notify_one();
    let info = wait_for_terminal(&downloader, id).await;
    assert_eq!(info.status, Status::Completed);
    assert_eq!(info.progress, 100.0, "completion always lands on exactly 100");
}

#[tokio::test]
async fn pollers_never_observe_100_before_completed() {
    let temp_dir = tempfile::tempdir().unwrap();
    let gate = Arc::new(Notify::new());
    // The transfer reports fully downloaded and finished, then stalls in
    // post-processing until the gate opens.
    let fetcher = MockFetcher::with_progress(
        FetchBehavior::Block {
            gate: gate.clone(),
            filename: "Merged.mp4".to_string(),
        },
        vec![
            FetchProgress::Bytes {
                downloaded: 100,
                total: Some(100),
            },
            FetchProgress::Finished,
        ],
    );
    let downloader = downloader_with_config(test_config(temp_dir.path()), fetcher).await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();

    let d = downloader.clone();
    wait_until("progress to reach the fetch-phase cap", || {
        let d = d.clone();
        async move { d.query(id).await.map(|i| i.progress == 99.0).unwrap_or(false) }
    })
    .await;

    let info = downloader.query(id).await.unwrap();
    assert_eq!(info.status, Status::Processing);
    assert!(
        info.progress < 100.0,
        "progress 100 must only be observable together with completed"
    );

    gate.notify_one();
    let info = wait_for_terminal(&downloader, id).await;
    assert_eq!(info.progress, 100.0);
}

#[tokio::test]
async fn concurrent_pollers_see_a_non_regressing_view() {
    let temp_dir = tempfile::tempdir().unwrap();
    let script: Vec<FetchProgress> = (1..=20)
        .map(|i| FetchProgress::Bytes {
            downloaded: i * 5,
            total: Some(100),
        })
        .collect();
    let fetcher = MockFetcher::with_progress(
        FetchBehavior::WriteFile {
            filename: "Steady.mp4".to_string(),
            report_descriptor: true,
        },
        script,
    );
    let downloader = downloader_with_config(test_config(temp_dir.path()), fetcher).await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();

    let mut pollers = Vec::new();
    for _ in 0..2 {
        let d = downloader.clone();
        pollers.push(tokio::spawn(async move {
            let mut last = 0.0f32;
            loop {
                let Ok(info) = d.query(id).await else { break };
                assert!(
                    info.progress >= last,
                    "observed progress regression: {last} -> {}",
                    info.progress
                );
                assert!(
                    info.status == Status::Completed || info.progress < 100.0,
                    "saw 100 while status was {:?}",
                    info.status
                );
                last = info.progress;
                if info.status.is_terminal() {
                    break;
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    wait_for_terminal(&downloader, id).await;
    for poller in pollers {
        poller.await.unwrap();
    }
}

#[tokio::test]
async fn fetch_failure_message_lands_in_the_record() {
    let temp_dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new(FetchBehavior::Fail {
        message: "requested format not available".to_string(),
    });
    let downloader = downloader_with_config(test_config(temp_dir.path()), fetcher).await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();
    let info = wait_for_terminal(&downloader, id).await;

    assert_eq!(info.status, Status::Failed);
    let error = info.error.unwrap();
    assert!(
        error.contains("requested format not available"),
        "got: {error}"
    );
}

#[tokio::test]
async fn panicking_fetcher_becomes_a_failed_job_not_a_stuck_one() {
    let temp_dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new(FetchBehavior::Panic);
    let downloader = downloader_with_config(test_config(temp_dir.path()), fetcher).await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();
    let info = wait_for_terminal(&downloader, id).await;

    assert_eq!(info.status, Status::Failed);
    let error = info.error.unwrap();
    assert!(error.contains("aborted"), "got: {error}");
}

#[tokio::test]
async fn success_without_descriptor_falls_back_to_the_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new(FetchBehavior::WriteFile {
        filename: "Scanned.mp4".to_string(),
        report_descriptor: false,
    });
    let downloader = downloader_with_config(test_config(temp_dir.path()), fetcher).await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();
    let info = wait_for_terminal(&downloader, id).await;

    assert_eq!(info.status, Status::Completed);
    let record = downloader.store.get(id).await.unwrap();
    assert_eq!(record.artifact_name.as_deref(), Some("Scanned.mp4"));
}

#[tokio::test]
async fn empty_result_directory_fails_with_an_explicit_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new(FetchBehavior::WriteNothing);
    let downloader = downloader_with_config(test_config(temp_dir.path()), fetcher).await;

    let id = downloader.enqueue(TEST_URL, best_video()).await.unwrap();
    let info = wait_for_terminal(&downloader, id).await;

    assert_eq!(info.status, Status::Failed);
    let error = info.error.unwrap();
    assert!(error.contains("no artifact"), "got: {error}");

    let workdir = downloader.config.job_dir(id);
    let d = downloader.clone();
    wait_until("workdir removal after failure", || {
        let workdir = workdir.clone();
        let _d = d.clone();
        async move { !tokio::fs::try_exists(&workdir).await.unwrap_or(true) }
    })
    .await;
}

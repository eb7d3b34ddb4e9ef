// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

use std::sync::{Arc, Mutex};
use std::time::Duration;

use engine_context::platform::{Backend, BackendSelector};
use engine_context::*;

#[test]
fn background_tasks_run_after_one_iteration() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dispatcher = Arc::new(QueueDispatcher::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    let (d, l) = (dispatcher.clone(), log.clone());
    std::thread::spawn(move || {
        for i in 1..=3 {
            let l = l.clone();
            d.schedule(Box::new(move || l.lock().unwrap().push(i))).unwrap();
        }
    })
    .join()
    .unwrap();

    assert!(log.lock().unwrap().is_empty());
    assert_eq!(dispatcher.pump(), Ok(3));
    assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(dispatcher.pump(), Ok(0));
    assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn scheduling_on_the_main_thread_is_deferred() {
    let dispatcher = Arc::new(QueueDispatcher::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    let (d, l) = (dispatcher.clone(), log.clone());
    dispatcher
        .schedule(Box::new(move || {
            l.lock().unwrap().push("outer");
            let l = l.clone();
            d.schedule(Box::new(move || l.lock().unwrap().push("inner"))).unwrap();
        }))
        .unwrap();

    assert!(log.lock().unwrap().is_empty());
    dispatcher.pump().unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["outer"]);
    dispatcher.pump().unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
}

#[test]
fn sender_round_trip_with_selected_backend() {
    let backend = BackendSelector::new().backend_name("queue".into()).select().unwrap();
    let sender = MainThreadSender::new(backend.dispatcher());
    assert!(sender.is_main_thread());
    assert_eq!(sender.main_thread_id(), SystemThreadId::current());

    let s = sender.clone();
    let worker = std::thread::spawn(move || {
        assert!(!s.is_main_thread());
        s.send_and_wait(SystemThreadId::current)
    });
    let Backend::Queue(queue) = &backend else { unreachable!() };
    while !worker.is_finished() {
        queue.pump_timeout(Duration::from_millis(10)).unwrap();
    }
    assert_eq!(worker.join().unwrap(), Ok(SystemThreadId::current()));

    // Inline on the main thread, no pump needed.
    assert_eq!(sender.send_and_wait(|| 7), Ok(7));
}

#[test]
fn shutdown_rejects_tasks() {
    let dispatcher = QueueDispatcher::new();
    dispatcher.shutdown();
    assert_eq!(dispatcher.schedule(Box::new(|| {})), Err(DispatchError::Terminated));
    assert_eq!(dispatcher.pending(), 0);
}

//! `ndn-cli scheduler`: schedule a handful of deadline events over a
//! manual reactor and drain them, as a smoke test for `ndn-scheduler`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;

use ndn_scheduler::{ManualReactor, Scheduler};

use crate::utils::print_header;

pub fn run(count: usize) -> Result<()> {
    let scheduler = Scheduler::new(ManualReactor::new());
    let fired = Rc::new(RefCell::new(Vec::new()));

    print_header("Scheduler smoke test");
    for i in 0..count {
        let fired = Rc::clone(&fired);
        let after = Duration::from_millis((count - i) as u64 * 10);
        scheduler.schedule(after, move || fired.borrow_mut().push(i));
    }
    println!("scheduled {count} events");

    scheduler.reactor_mut().advance(Duration::from_secs(10));
    let ran = scheduler.poll();
    println!("poll() ran {ran} events");
    println!("firing order (should be latest-scheduled-fires-last reversed, i.e. ascending deadline): {:?}", fired.borrow());
    Ok(())
}

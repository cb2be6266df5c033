use std::{env, thread, time::Duration};

use multiwii::{
    values::{Attitude, RcChannels, Status},
    Command, Config, Scheduler,
};

fn main() {
    env_logger::init();

    let path = env::args().nth(1).expect("no serial port supplied");
    let port = multiwii::transport::open(&path, 115_200, Duration::from_millis(50))
        .expect("failed to open serial port");

    let mut scheduler = Scheduler::new(port, Config::default());
    scheduler.start().expect("failed to start scheduler");
    scheduler.request(Command::Ident).expect("IDENT is a get command");

    let store = scheduler.store();
    for _ in 0..50 {
        thread::sleep(Duration::from_millis(200));

        if !scheduler.is_running() {
            break;
        }
        match store.get_as::<Attitude>() {
            Ok(Some(attitude)) => println!("{:?}", attitude),
            Ok(None) => println!("attitude not reported yet"),
            Err(err) => eprintln!("{err}"),
        }
        if let Ok(Some(rc)) = store.get_as::<RcChannels>() {
            println!("{:?}", rc);
        }
        if let Ok(Some(status)) = store.get_as::<Status>() {
            println!("cycle time {}us, sensors {:?}", status.cycle_time, status.sensors);
        }
    }

    if let Some(ident) = store.get(Command::Ident) {
        println!("ident {:?}", ident);
    }

    if let Err(e) = scheduler.stop() {
        eprintln!("{}", e);
    }
}

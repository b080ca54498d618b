use rand::{rngs::StdRng, Rng, SeedableRng};
use vm::{
    mmu::{Access, Mmu},
    page_replacer::AgingPageReplacer,
    process::Process,
    Config, FallbackPolicy, Simulation, Stats, Tier, VmError,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// 4 integers per page, two pinned pages per process.
fn small_config(user_frames: usize, nff_min: usize) -> Config {
    Config {
        page_size: 16,
        user_frames,
        page_table_entries: 16,
        essential_pages: 2,
        nff_min,
        fallback: FallbackPolicy::MostRecent,
    }
}

#[test]
fn pool_holding_only_essential_pages_has_no_victim() {
    init_logger();

    let mut sim = Simulation::new(small_config(2, 0)).unwrap();
    sim.spawn(2, vec![1]).unwrap();

    let err = sim.run_to_completion().unwrap_err();
    assert_eq!(err, VmError::NoVictim { pid: 0, page: 2 });
}

#[test]
fn one_spare_frame_forces_a_single_replacement() {
    init_logger();

    let mut sim = Simulation::new(small_config(3, 0)).unwrap();
    // Midpoints 3, 5, 6 touch pages 2, 3, 3; page 3 has to evict page 2.
    sim.spawn(8, vec![7]).unwrap();

    let report = sim.run_to_completion().unwrap();

    let stats = report.processes[0];
    assert_eq!(stats.page_accesses, 3);
    assert_eq!(stats.page_faults, 2);
    assert_eq!(stats.page_replacements, 1);
    assert_eq!(stats.attempts_for(Tier::SameOwner), 1);
    assert_eq!(report.total, stats);
}

#[test]
fn roomy_pool_only_takes_cold_misses() {
    init_logger();

    let mut sim = Simulation::new(Config::default()).unwrap();
    sim.spawn(100_000, vec![0, 99_999, 50_000, 1234]).unwrap();
    sim.spawn(100_000, vec![77_777, 3, 64_000, 99_000]).unwrap();

    let report = sim.run_to_completion().unwrap();

    for stats in &report.processes {
        assert!(stats.page_faults > 0);
        assert_eq!(stats.page_replacements, 0);
        assert_eq!(stats.attempts, [0; 4]);
    }
    assert_eq!(sim.mmu().free_frames().len(), Config::default().user_frames);
}

#[test]
fn recycled_pid_faults_back_into_its_old_frame() {
    init_logger();

    let mut mmu = Mmu::new(small_config(12, 7), AgingPageReplacer::new()).unwrap();

    let mut first = Process::new(0, 40, vec![0], &mut mmu).unwrap();
    for page in 2..5 {
        assert_eq!(mmu.reference(&mut first, page), Ok(Access::ColdMiss));
    }
    let old_frame = first.page_table().frame_of(2).unwrap();

    let mut neighbours = vec![
        Process::new(1, 40, vec![0], &mut mmu).unwrap(),
        Process::new(2, 40, vec![0], &mut mmu).unwrap(),
    ];

    mmu.release(&mut first);

    // pid 0 is free again once its first holder has terminated.
    let mut successor = Process::new(0, 40, vec![0], &mut mmu).unwrap();
    for neighbour in &mut neighbours {
        mmu.release(neighbour);
    }

    for page in 5..8 {
        assert_eq!(mmu.reference(&mut successor, page), Ok(Access::ColdMiss));
    }
    assert_eq!(mmu.free_frames().len(), 7);

    assert_eq!(
        mmu.reference(&mut successor, 2),
        Ok(Access::WarmMiss(Tier::ExactReuse))
    );
    assert_eq!(successor.page_table().frame_of(2), Some(old_frame));
    assert!(!successor.page_table().get(5).is_valid());
    assert_eq!(successor.stats().page_replacements, 1);
    assert_eq!(mmu.stats().attempts_for(Tier::ExactReuse), 1);
}

fn run_checked(config: Config, seed: u64) -> vm::Report {
    let mut rng = StdRng::seed_from_u64(seed);
    let essential_pages = config.essential_pages;
    let mut sim = Simulation::new(config).unwrap();

    for _ in 0..3 {
        let keys = (0..20).map(|_| rng.random_range(0..40)).collect();
        sim.spawn(40, keys).unwrap();
    }

    loop {
        let more = sim.step().unwrap();

        sim.verify_frame_ownership().unwrap();

        for process in sim.processes().iter().filter(|p| !p.is_terminated()) {
            for page in 0..essential_pages {
                assert!(
                    process.page_table().get(page).is_valid(),
                    "process {} lost essential page {}",
                    process.pid(),
                    page
                );
            }
            let stats = process.stats();
            assert_eq!(stats.attempts_total(), stats.page_replacements);
        }

        if !more {
            break;
        }
    }

    sim.report()
}

#[test]
fn frames_stay_singly_owned_under_pressure() {
    init_logger();

    let config = Config {
        fallback: FallbackPolicy::Random { seed: 3 },
        ..small_config(26, 2)
    };
    let report = run_checked(config, 7);

    let mut sum = Stats::default();
    for stats in &report.processes {
        sum += stats;
    }
    assert_eq!(sum, report.total);
    assert_eq!(report.total.attempts_total(), report.total.page_replacements);
    assert!(report.total.page_replacements > 0);
}

#[test]
fn seeded_runs_are_reproducible() {
    let config = Config {
        fallback: FallbackPolicy::Random { seed: 11 },
        ..small_config(26, 2)
    };

    let first = run_checked(config.clone(), 5);
    let second = run_checked(config, 5);

    assert_eq!(first, second);
}

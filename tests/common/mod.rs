//! Shared test environment: a bootstrapped deployment with funded
//! accounts, an enabled reserve token, and a small staked position.

#![allow(dead_code)]

use std::sync::Once;

use fiscus::prelude::*;

static TRACING: Once = Once::new();

/// Install a log subscriber once per test binary; filter with RUST_LOG
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One reserve-token unit (18 decimals)
pub const RESERVE_UNIT: u128 = 1_000_000_000_000_000_000;

/// Blocks per epoch in the test deployment
pub const EPOCH_LENGTH: u64 = 10;

/// A deployed protocol with named actors
pub struct Env {
    pub p: Protocol,
    pub governor: Address,
    pub guardian: Address,
    pub policy: Address,
    pub deployer: Address,
    pub alice: Address,
    pub bob: Address,
    pub dai: Address,
    pub staking: Address,
    pub treasury: Address,
    pub distributor: Address,
}

impl Env {
    /// Shorthand for the current displayed sFISC balance
    pub fn sfisc_of(&self, who: Address) -> u64 {
        self.p.sfisc.balance_of(who)
    }

    /// Shorthand for the current FISC balance
    pub fn fisc_of(&self, who: Address) -> u64 {
        self.p.fisc.balance_of(who)
    }
}

/// Deploy with genesis index 10.0, a DAI reserve backing 10,000 value,
/// 1,000 FISC minted to the deployer, 500 staked, and small FISC/sFISC
/// balances handed to alice and bob.
pub fn env() -> Env {
    init_tracing();

    let governor = Address::from_label("governor");
    let guardian = Address::from_label("guardian");
    let policy = Address::from_label("policy");
    let deployer = Address::from_label("deployer");
    let alice = Address::from_label("alice");
    let bob = Address::from_label("bob");
    let staking = Address::from_label("staking");
    let treasury = Address::from_label("treasury");
    let distributor = Address::from_label("distributor");
    let dai = Address::from_label("dai");

    // the treasury is the vault: it alone mints FISC
    let authority = Authority::new(governor, guardian, policy, treasury).unwrap();
    let config = ProtocolConfig {
        base_address: Address::from_label("fisc"),
        wrapped_address: Address::from_label("gfisc"),
        staking_address: staking,
        treasury_address: treasury,
        epoch_length: EPOCH_LENGTH,
        first_epoch_number: 1,
        first_epoch_end: 9,
        initial_index: 10 * INDEX_ONE,
        treasury_timelock_blocks: 10,
    };
    let mut p = Protocol::new(config, authority, deployer).unwrap();

    let mut dai_ledger = ReserveToken::new(dai, "Dai Stablecoin", "DAI").unwrap();
    dai_ledger.mint(deployer, 10_000 * RESERVE_UNIT);
    p.add_reserve_token(dai_ledger);

    p.enable_permission(governor, Permission::ReserveToken, dai).unwrap();
    p.enable_permission(governor, Permission::ReserveDepositor, deployer).unwrap();
    p.enable_permission(governor, Permission::RewardManager, distributor).unwrap();

    // 10,000 DAI backs 1,000 FISC; the other 9,000 is excess reserves
    p.reserves.get_mut(&dai).unwrap().approve(deployer, treasury, 10_000 * RESERVE_UNIT);
    let minted = p.deposit(deployer, dai, 10_000 * RESERVE_UNIT, 9_000 * BASE_UNIT).unwrap();
    assert_eq!(minted, 1_000 * BASE_UNIT);

    p.install_distributor(governor, distributor).unwrap();
    p.add_distributor_recipient(governor, staking, 1_000).unwrap();

    // warmup is zero at genesis, so this pays sFISC immediately
    p.fisc.approve(deployer, staking, 500 * BASE_UNIT);
    p.stake(deployer, deployer, 500 * BASE_UNIT, true, true).unwrap();

    p.sfisc.transfer(deployer, alice, 10 * BASE_UNIT).unwrap();
    p.fisc.transfer(deployer, alice, 100 * BASE_UNIT).unwrap();
    p.fisc.transfer(deployer, bob, 100 * BASE_UNIT).unwrap();

    Env {
        p,
        governor,
        guardian,
        policy,
        deployer,
        alice,
        bob,
        dai,
        staking,
        treasury,
        distributor,
    }
}

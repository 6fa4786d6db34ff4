
use common::*;
use instrument_core::IssuanceState;
use soroban_sdk::{token, Bytes, InvokeError};

/// Total settlement tokens the escrow contract holds never changes while
/// value shuffles between free balances and issuance sub-ledgers.
fn assert_native_custody(ctx: &TestContext, expected: i128) {
    let held = token::Client::new(&ctx.env, &ctx.native_token).balance(&ctx.escrow_id);
    assert_eq!(held, expected);
}

#[test]
fn full_repayment_at_day_20() {
    let ctx = setup();
    let t0 = ctx.now();
    let issuance_id = ctx.create_active_issuance();

    ctx.advance_days(20);
    ctx.platform().deposit(&ctx.buyer, &issuance_id, &BORROW);

    let props = ctx.loan().get_properties(&issuance_id);
    assert_eq!(props.interest, 600);
    assert_eq!(props.repaid_amount, BORROW);

    // settle at tenor end
    ctx.advance_days(10);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &(t0 + 30 * SECONDS_PER_DAY),
        &ctx.event_name("loan_expired"),
        &Bytes::new(&ctx.env),
    );

    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Complete
    );
    // seller: principal back plus 600 token-units of interest
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 20 * ETHER);
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.seller, &ctx.collateral_token),
        600
    );
    // buyer: collateral back net of interest
    assert_eq!(ctx.escrow().balance_of(&ctx.buyer), 20 * ETHER);
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.buyer, &ctx.collateral_token),
        399_400
    );
    assert_eq!(ctx.escrow().balance_of_issuance(&issuance_id), 0);
    assert_eq!(
        ctx.escrow()
            .token_balance_of_issuance(&issuance_id, &ctx.collateral_token),
        0
    );

    // the grace deadline fires later as a no-op
    ctx.advance_days(5);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &(t0 + 35 * SECONDS_PER_DAY),
        &ctx.event_name("grace_period_expired"),
        &Bytes::new(&ctx.env),
    );
    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Complete
    );
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.seller, &ctx.collateral_token),
        600
    );

    // all internal moves, no custody changes
    assert_native_custody(&ctx, 60 * ETHER);
}

#[test]
fn repayment_during_grace_period() {
    let ctx = setup();
    let t0 = ctx.now();
    let issuance_id = ctx.create_active_issuance();

    // tenor passes unpaid; the loan deadline alone does not settle
    ctx.advance_days(32);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &(t0 + 30 * SECONDS_PER_DAY),
        &ctx.event_name("loan_expired"),
        &Bytes::new(&ctx.env),
    );
    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Active
    );

    // repayment at day 32, inside the grace period
    ctx.platform().deposit(&ctx.buyer, &issuance_id, &BORROW);
    assert_eq!(ctx.loan().get_properties(&issuance_id).interest, 960);

    ctx.advance_days(3);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &(t0 + 35 * SECONDS_PER_DAY),
        &ctx.event_name("grace_period_expired"),
        &Bytes::new(&ctx.env),
    );

    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Complete
    );
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 20 * ETHER);
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.seller, &ctx.collateral_token),
        960
    );
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.buyer, &ctx.collateral_token),
        399_040
    );
}

#[test]
fn repayment_in_installments() {
    let ctx = setup();
    let t0 = ctx.now();
    let issuance_id = ctx.create_active_issuance();

    ctx.advance_days(10);
    ctx.platform()
        .deposit(&ctx.buyer, &issuance_id, &(3 * ETHER));
    assert_eq!(ctx.loan().get_properties(&issuance_id).interest, 180);

    ctx.advance_days(22);
    ctx.platform()
        .deposit(&ctx.buyer, &issuance_id, &(2 * ETHER));
    assert_eq!(ctx.loan().get_properties(&issuance_id).interest, 564);

    ctx.advance_days(3);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &(t0 + 35 * SECONDS_PER_DAY),
        &ctx.event_name("grace_period_expired"),
        &Bytes::new(&ctx.env),
    );

    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Complete
    );
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 20 * ETHER);
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.seller, &ctx.collateral_token),
        564
    );
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.buyer, &ctx.collateral_token),
        399_436
    );
}

#[test]
fn default_forfeits_interest_share_of_collateral() {
    let ctx = setup();
    let t0 = ctx.now();
    let issuance_id = ctx.create_active_issuance();

    // no repayment at all
    ctx.advance_days(35);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &(t0 + 35 * SECONDS_PER_DAY),
        &ctx.event_name("grace_period_expired"),
        &Bytes::new(&ctx.env),
    );

    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Delinquent
    );
    // the seller keeps the accrued default interest in collateral terms
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.seller, &ctx.collateral_token),
        1_050
    );
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.buyer, &ctx.collateral_token),
        398_950
    );
    // the borrowed funds stay with the buyer
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 15 * ETHER);
    assert_eq!(ctx.escrow().balance_of(&ctx.buyer), 25 * ETHER);
    assert_eq!(
        ctx.escrow()
            .token_balance_of_issuance(&issuance_id, &ctx.collateral_token),
        0
    );

    assert_native_custody(&ctx, 60 * ETHER);
}

#[test]
fn partial_repayment_still_defaults() {
    let ctx = setup();
    let t0 = ctx.now();
    let issuance_id = ctx.create_active_issuance();

    ctx.advance_days(10);
    ctx.platform()
        .deposit(&ctx.buyer, &issuance_id, &(2 * ETHER));

    ctx.advance_days(25);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &(t0 + 35 * SECONDS_PER_DAY),
        &ctx.event_name("grace_period_expired"),
        &Bytes::new(&ctx.env),
    );

    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Delinquent
    );
    // 120 accrued by the installment, 630 by the unpaid 3 ETHER remainder
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.seller, &ctx.collateral_token),
        750
    );
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.buyer, &ctx.collateral_token),
        399_250
    );
    // the partial repayment reaches the seller
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 17 * ETHER);
    assert_eq!(ctx.escrow().balance_of(&ctx.buyer), 23 * ETHER);
}

#[test]
fn repayment_cannot_exceed_borrow_amount() {
    let ctx = setup();
    let issuance_id = ctx.create_active_issuance();

    ctx.advance_days(10);
    let result = ctx
        .platform()
        .try_deposit(&ctx.buyer, &issuance_id, &(6 * ETHER));
    assert_eq!(
        result,
        Err(Err(InvokeError::Contract(
            loan::Error::RepayExceedsBorrowAmount as u32
        )))
    );

    ctx.platform()
        .deposit(&ctx.buyer, &issuance_id, &(3 * ETHER));
    let result = ctx
        .platform()
        .try_deposit(&ctx.buyer, &issuance_id, &(3 * ETHER));
    assert_eq!(
        result,
        Err(Err(InvokeError::Contract(
            loan::Error::RepayExceedsBorrowAmount as u32
        )))
    );
}

#[test]
fn scheduled_events_process_exactly_once() {
    let ctx = setup();
    let t0 = ctx.now();
    let issuance_id = ctx.create_active_issuance();

    ctx.advance_days(35);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &(t0 + 35 * SECONDS_PER_DAY),
        &ctx.event_name("grace_period_expired"),
        &Bytes::new(&ctx.env),
    );

    let result = ctx.platform().try_process_scheduled_event(
        &issuance_id,
        &(t0 + 35 * SECONDS_PER_DAY),
        &ctx.event_name("grace_period_expired"),
        &Bytes::new(&ctx.env),
    );
    assert_eq!(result, Err(Ok(platform::Error::EventAlreadyProcessed)));

    // tuples that were never registered are rejected outright
    let result = ctx.platform().try_process_scheduled_event(
        &issuance_id,
        &(t0 + 36 * SECONDS_PER_DAY),
        &ctx.event_name("grace_period_expired"),
        &Bytes::new(&ctx.env),
    );
    assert_eq!(result, Err(Ok(platform::Error::EventNotScheduled)));
}

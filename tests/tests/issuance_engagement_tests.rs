
use common::*;
use instrument_core::IssuanceState;
use soroban_sdk::{Bytes, InvokeError};

#[test]
fn engage_and_post_collateral() {
    let ctx = setup();
    let issuance_id = ctx.create_funded_issuance();

    ctx.platform()
        .engage_issuance(&ctx.buyer, &issuance_id, &Bytes::new(&ctx.env));
    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Active
    );

    // engagement itself moves no value
    assert_eq!(ctx.escrow().balance_of_issuance(&issuance_id), BORROW);
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 15 * ETHER);
    assert_eq!(ctx.escrow().balance_of(&ctx.buyer), 20 * ETHER);
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.buyer, &ctx.collateral_token),
        400_000
    );

    // posting the full collateral releases the borrowed funds to the buyer
    ctx.platform().deposit_token(
        &ctx.buyer,
        &issuance_id,
        &ctx.collateral_token,
        &COLLATERAL,
    );

    assert_eq!(ctx.escrow().balance_of_issuance(&issuance_id), 0);
    assert_eq!(ctx.escrow().balance_of(&ctx.buyer), 25 * ETHER);
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 15 * ETHER);
    assert_eq!(
        ctx.escrow()
            .token_balance_of_issuance(&issuance_id, &ctx.collateral_token),
        COLLATERAL
    );
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.buyer, &ctx.collateral_token),
        100_000
    );

    let props = ctx.loan().get_properties(&issuance_id);
    assert!(props.collateral_complete);
    assert_eq!(props.buyer, Some(ctx.buyer.clone()));
}

#[test]
fn collateral_in_multiple_rounds() {
    let ctx = setup();
    let issuance_id = ctx.create_funded_issuance();
    ctx.platform()
        .engage_issuance(&ctx.buyer, &issuance_id, &Bytes::new(&ctx.env));

    ctx.platform()
        .deposit_token(&ctx.buyer, &issuance_id, &ctx.collateral_token, &50_000);
    ctx.platform()
        .deposit_token(&ctx.buyer, &issuance_id, &ctx.collateral_token, &100_000);

    // nothing released until the full collateral is in
    assert_eq!(ctx.escrow().balance_of(&ctx.buyer), 20 * ETHER);
    assert_eq!(ctx.escrow().balance_of_issuance(&issuance_id), BORROW);

    ctx.platform()
        .deposit_token(&ctx.buyer, &issuance_id, &ctx.collateral_token, &150_000);

    assert_eq!(ctx.escrow().balance_of(&ctx.buyer), 25 * ETHER);
    assert_eq!(ctx.escrow().balance_of_issuance(&issuance_id), 0);
    assert_eq!(
        ctx.escrow()
            .token_balance_of_issuance(&issuance_id, &ctx.collateral_token),
        COLLATERAL
    );

    // the cap still holds afterwards
    let result = ctx.platform().try_deposit_token(
        &ctx.buyer,
        &issuance_id,
        &ctx.collateral_token,
        &1_000,
    );
    assert_eq!(
        result,
        Err(Err(InvokeError::Contract(
            loan::Error::CollateralExceedsAmount as u32
        )))
    );
}

#[test]
fn engaging_twice_fails() {
    let ctx = setup();
    let issuance_id = ctx.create_funded_issuance();

    ctx.platform()
        .engage_issuance(&ctx.buyer, &issuance_id, &Bytes::new(&ctx.env));

    let result =
        ctx.platform()
            .try_engage_issuance(&ctx.buyer2, &issuance_id, &Bytes::new(&ctx.env));
    assert_eq!(
        result,
        Err(Err(InvokeError::Contract(loan::Error::NotEngagable as u32)))
    );
}

#[test]
fn engagement_expiry_returns_deposit() {
    let ctx = setup();
    let issuance_id = ctx.create_funded_issuance();
    let due = ctx.now() + 20 * SECONDS_PER_DAY;

    let result = ctx.platform().try_process_scheduled_event(
        &issuance_id,
        &due,
        &ctx.event_name("engagement_expired"),
        &Bytes::new(&ctx.env),
    );
    assert_eq!(result, Err(Ok(platform::Error::EventNotDue)));

    ctx.advance_seconds(20 * SECONDS_PER_DAY + 100);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &due,
        &ctx.event_name("engagement_expired"),
        &Bytes::new(&ctx.env),
    );

    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::CompleteNotEngaged
    );
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 20 * ETHER);
    assert_eq!(ctx.escrow().balance_of_issuance(&issuance_id), 0);

    // the window is closed for buyers as well
    let result =
        ctx.platform()
            .try_engage_issuance(&ctx.buyer, &issuance_id, &Bytes::new(&ctx.env));
    assert_eq!(
        result,
        Err(Err(InvokeError::Contract(loan::Error::NotEngagable as u32)))
    );
}

#[test]
fn delinquent_without_collateral() {
    let ctx = setup();
    let issuance_id = ctx.create_funded_issuance();
    ctx.platform()
        .engage_issuance(&ctx.buyer, &issuance_id, &Bytes::new(&ctx.env));
    let due = ctx.now() + 5 * SECONDS_PER_DAY;

    let result = ctx.platform().try_process_scheduled_event(
        &issuance_id,
        &due,
        &ctx.event_name("collateral_expired"),
        &Bytes::new(&ctx.env),
    );
    assert_eq!(result, Err(Ok(platform::Error::EventNotDue)));

    ctx.advance_seconds(5 * SECONDS_PER_DAY + 100);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &due,
        &ctx.event_name("collateral_expired"),
        &Bytes::new(&ctx.env),
    );

    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Delinquent
    );
    // the funding went back to the seller, the buyer is untouched
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 20 * ETHER);
    assert_eq!(ctx.escrow().balance_of(&ctx.buyer), 20 * ETHER);
    assert_eq!(ctx.escrow().balance_of_issuance(&issuance_id), 0);
}

#[test]
fn delinquent_with_partial_collateral() {
    let ctx = setup();
    let issuance_id = ctx.create_funded_issuance();
    ctx.platform()
        .engage_issuance(&ctx.buyer, &issuance_id, &Bytes::new(&ctx.env));
    let due = ctx.now() + 5 * SECONDS_PER_DAY;

    ctx.platform()
        .deposit_token(&ctx.buyer, &issuance_id, &ctx.collateral_token, &100_000);

    ctx.advance_seconds(5 * SECONDS_PER_DAY + 100);
    ctx.platform().process_scheduled_event(
        &issuance_id,
        &due,
        &ctx.event_name("collateral_expired"),
        &Bytes::new(&ctx.env),
    );

    assert_eq!(
        ctx.platform().get_issuance(&issuance_id).state,
        IssuanceState::Delinquent
    );
    // funding back to the seller, partial collateral back to the buyer
    assert_eq!(ctx.escrow().balance_of(&ctx.seller), 20 * ETHER);
    assert_eq!(ctx.escrow().balance_of(&ctx.buyer), 20 * ETHER);
    assert_eq!(
        ctx.escrow()
            .token_balance_of(&ctx.buyer, &ctx.collateral_token),
        400_000
    );
    assert_eq!(ctx.escrow().balance_of_issuance(&issuance_id), 0);
    assert_eq!(
        ctx.escrow()
            .token_balance_of_issuance(&issuance_id, &ctx.collateral_token),
        0
    );
}

#[test]
fn deposit_routing_while_active() {
    let ctx = setup();
    let issuance_id = ctx.create_funded_issuance();
    ctx.platform()
        .engage_issuance(&ctx.buyer, &issuance_id, &Bytes::new(&ctx.env));

    // the seller's funding window is over
    let result = ctx
        .platform()
        .try_deposit(&ctx.seller, &issuance_id, &(2 * ETHER));
    assert_eq!(
        result,
        Err(Err(InvokeError::Contract(
            loan::Error::DepositNotInitiated as u32
        )))
    );

    // the buyer cannot repay before the collateral is in
    let result = ctx
        .platform()
        .try_deposit(&ctx.buyer, &issuance_id, &(2 * ETHER));
    assert_eq!(
        result,
        Err(Err(InvokeError::Contract(
            loan::Error::RepayBeforeCollateral as u32
        )))
    );

    // and nobody else may send at all
    let result = ctx
        .platform()
        .try_deposit(&ctx.buyer2, &issuance_id, &(2 * ETHER));
    assert_eq!(
        result,
        Err(Err(InvokeError::Contract(
            loan::Error::UnknownTransferer as u32
        )))
    );
}

#[test]
fn collateral_must_come_from_the_buyer() {
    let ctx = setup();
    let issuance_id = ctx.create_funded_issuance();
    ctx.platform()
        .engage_issuance(&ctx.buyer, &issuance_id, &Bytes::new(&ctx.env));

    fund_escrow_collateral(&ctx, &ctx.buyer2, 400_000);
    let result = ctx.platform().try_deposit_token(
        &ctx.buyer2,
        &issuance_id,
        &ctx.collateral_token,
        &100_000,
    );
    assert_eq!(
        result,
        Err(Err(InvokeError::Contract(
            loan::Error::CollateralNotFromBuyer as u32
        )))
    );
}

//! Bank Account Example - Given/When/Then Demonstration
//!
//! An in-memory bank stands in for an event-sourced system:
//!
//! - **Given**: account history is seeded per stream
//! - **When**: deposit and withdrawal commands are dispatched
//! - **Then**: published events, returned errors and services are checked
//!
//! The last scenario fails on purpose and prints the report `outcomes`
//! produces, pointing at the first diverging event of each stream.

use std::{borrow::Cow, collections::BTreeMap};

use outcomes::{Adapter, Error, Exclusion, Label, MessageMatch, Result, Scenario, StreamId, Streams};
use serde::Serialize;

// ============================================================================
// Domain Types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
enum AccountEvent {
    Opened { owner: String },
    Deposited { amount: i64 },
    Withdrawn { amount: i64 },
}

impl Label for AccountEvent {
    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            AccountEvent::Opened { .. } => "Opened",
            AccountEvent::Deposited { .. } => "Deposited",
            AccountEvent::Withdrawn { .. } => "Withdrawn",
        })
    }
}

#[derive(Debug)]
enum Command {
    Deposit { account: &'static str, amount: i64 },
    Withdraw { account: &'static str, amount: i64 },
}

#[derive(Debug, thiserror::Error)]
enum BankError {
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },
}

/// Collaborators visible to arrange actions and checks.
#[derive(Debug, Default)]
struct Fees {
    withdrawal_fee: i64,
    collected: i64,
}

// ============================================================================
// Adapter
// ============================================================================

#[derive(Default)]
struct InMemoryBank {
    history: Streams<AccountEvent>,
    published: Streams<AccountEvent>,
    fees: Fees,
}

impl InMemoryBank {
    fn balance(&self, account: &StreamId) -> i64 {
        self.history
            .get(account)
            .into_iter()
            .chain(self.published.get(account))
            .flatten()
            .map(|event| match event {
                AccountEvent::Opened { .. } => 0,
                AccountEvent::Deposited { amount } => *amount,
                AccountEvent::Withdrawn { amount } => -amount,
            })
            .sum()
    }

    fn publish(&mut self, account: &str, event: AccountEvent) {
        self.published.entry(account.into()).or_default().push(event);
    }
}

impl Adapter for InMemoryBank {
    type Event = AccountEvent;
    type Command = Command;
    type Error = BankError;
    type Services = Fees;

    async fn before_test(&mut self) -> Result {
        self.history = BTreeMap::new();
        self.published = BTreeMap::new();
        Ok(())
    }

    async fn set_given_events(&mut self, streams: &Streams<AccountEvent>) -> Result {
        self.history = streams.clone();
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> std::result::Result<(), BankError> {
        match command {
            Command::Deposit { account, amount } => {
                self.publish(account, AccountEvent::Deposited { amount });
            }
            Command::Withdraw { account, amount } => {
                let balance = self.balance(&account.into());
                let requested = amount + self.fees.withdrawal_fee;
                if requested > balance {
                    return Err(BankError::InsufficientFunds { balance, requested });
                }
                self.fees.collected += self.fees.withdrawal_fee;
                self.publish(account, AccountEvent::Withdrawn { amount: requested });
            }
        }
        Ok(())
    }

    async fn published_events(&mut self) -> Result<Streams<AccountEvent>> {
        Ok(self.published.clone())
    }

    fn services(&mut self) -> &mut Fees {
        &mut self.fees
    }
}

// ============================================================================
// Scenarios
// ============================================================================

type BankScenario = Scenario<InMemoryBank>;

fn opened(owner: &str) -> AccountEvent {
    AccountEvent::Opened {
        owner: owner.to_string(),
    }
}

#[tokio::main]
async fn main() -> Result {
    let mut bank = InMemoryBank::default();

    println!("=== Given/When/Then Demonstration ===\n");

    println!("--- Scenario 1: Deposit after opening ---");
    BankScenario::for_stream("acc-1")
        .given([opened("ada")])
        .when(Command::Deposit {
            account: "acc-1",
            amount: 10,
        })
        .then(AccountEvent::Deposited { amount: 10 })
        .run(&mut bank)
        .await?;
    println!("  passed");

    println!("\n--- Scenario 2: Withdrawal fee and exclusions ---");
    BankScenario::for_stream("acc-1")
        .given_with(|fees| fees.withdrawal_fee = 1)
        .given([opened("ada"), AccountEvent::Deposited { amount: 20 }])
        .when(Command::Deposit {
            account: "acc-1",
            amount: 5,
        })
        .when(Command::Withdraw {
            account: "acc-1",
            amount: 9,
        })
        .then_not([Exclusion::new(|e| {
            matches!(e, AccountEvent::Withdrawn { .. })
        })])
        .then(AccountEvent::Withdrawn { amount: 10 })
        .then_check(|fees| fees.collected == 1)
        .run(&mut bank)
        .await?;
    println!("  passed");

    println!("\n--- Scenario 3: Rejected withdrawal ---");
    bank.fees = Fees::default();
    BankScenario::for_stream("acc-2")
        .given([opened("grace"), AccountEvent::Deposited { amount: 3 }])
        .when(Command::Withdraw {
            account: "acc-2",
            amount: 4,
        })
        .then_error_is::<BankError>()
        .then_error_message(MessageMatch::contains("insufficient funds"))
        .then_error_message_matching(r"requested 4$")
        .run(&mut bank)
        .await?;
    println!("  passed");

    println!("\n--- Scenario 4: Transfer across streams (fails on purpose) ---");
    let outcome = BankScenario::for_many()
        .given_on("acc-1", [opened("ada"), AccountEvent::Deposited { amount: 50 }])
        .given_on("acc-2", [opened("grace")])
        .when(Command::Withdraw {
            account: "acc-1",
            amount: 30,
        })
        .when(Command::Deposit {
            account: "acc-2",
            amount: 20,
        })
        .then_on("acc-1", AccountEvent::Withdrawn { amount: 30 })
        .then_on("acc-2", AccountEvent::Deposited { amount: 30 })
        .run(&mut bank)
        .await;

    match outcome {
        Err(Error::AssertionFailed(report)) => println!("{report}"),
        other => println!("  unexpected outcome: {other:?}"),
    }

    Ok(())
}

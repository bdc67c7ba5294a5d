use chrono::{Local, NaiveDate};
use clap::Args;
use daily_bill::billing::{
    parse_bill_date, BillCategory, BillRenderer, BillingSession, EntryForm, InlineSnapshot,
    MemoryStore, NightRate, RankChoice, TextBillRenderer,
};
use daily_bill::error::AppError;
use std::sync::Arc;

const DEMO_SNAPSHOT: &str = "Name,CardNo,Designation,DefaultTaka\n\
Abdul Karim,1001,S/O,50\n\
Rahima Begum,1002,LABOUR,600\n\
Jamal Uddin,1003,STORE ASSISTANT,50\n\
Nasir Ahmed,1004,DRIVER,350\n";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Bill date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_bill_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Bill the final document under this category instead of night entertainment
    #[arg(long)]
    pub(crate) category: Option<String>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let final_category = match args.category.as_deref() {
        Some(raw) => BillCategory::from_label(raw)
            .ok_or_else(|| AppError::InvalidInput(format!("unknown bill category '{raw}'")))?,
        None => BillCategory::NightEntertainment,
    };

    let mut session = BillingSession::bootstrap(
        Arc::new(MemoryStore::default()),
        &InlineSnapshot(Some(DEMO_SNAPSHOT.to_string())),
        "demo",
    );

    println!("Daily bill demo");
    println!(
        "Directory: {} records (snapshot {:?})",
        session.directory().len(),
        session.snapshot_status()
    );

    let suggestions = session.type_name("kar");
    println!("\nSuggestions for 'kar'");
    for employee in &suggestions {
        println!("- {} ({}), {}", employee.name, employee.card_no, employee.designation);
    }

    session.select_suggestion("1001")?;
    print_added(&mut session);

    session.type_card_no("1002");
    print_added(&mut session);

    session.type_card_no("1004");
    print_added(&mut session);

    session.replace_form(EntryForm {
        name: "Sumon Mia".to_string(),
        card_no: "2001".to_string(),
        rank: RankChoice::Other,
        custom_rank: "GUARD".to_string(),
        remarks: "new joiner".to_string(),
    });
    print_added(&mut session);
    println!(
        "Directory now holds {} records (new card 2001 registered)",
        session.directory().len()
    );

    println!("\nSwitching category to {}", BillCategory::NightEntertainment);
    session.set_category(BillCategory::NightEntertainment);
    if session.set_night_rate(NightRate::Reduced).is_ok() {
        println!("Night rate set to {} Tk", NightRate::Reduced.amount());
    }
    print_amounts(&session);

    if final_category != BillCategory::NightEntertainment {
        println!("\nSwitching category to {final_category}");
        session.set_category(final_category);
        print_amounts(&session);
    }

    let document = session.document(date)?;
    let renderer = TextBillRenderer;
    let bytes = renderer
        .render(&document)
        .map_err(|err| AppError::Billing(err.into()))?;

    println!("\n--- {} ---", document.file_name(renderer.extension()));
    print!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

fn print_added(session: &mut BillingSession<MemoryStore>) {
    let quoted = session.current_taka();
    if let Some(outcome) = session.add_entry() {
        println!(
            "Added {} ({}) as {} at {} Tk{}",
            outcome.item.name,
            outcome.item.card_no,
            outcome.item.designation,
            quoted,
            if outcome.directory_added {
                ", new directory record"
            } else {
                ""
            }
        );
    }
}

fn print_amounts(session: &BillingSession<MemoryStore>) {
    for (index, item) in session.bill().items().iter().enumerate() {
        println!(
            "{:02} {} [{}] {} Tk",
            index + 1,
            item.name,
            item.designation,
            item.taka
        );
    }
    println!("Total: {} Tk", session.bill().total());
}

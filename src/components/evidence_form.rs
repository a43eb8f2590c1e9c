use leptos::prelude::*;

use crate::network::NodeId;
use crate::prediction::{EvidenceLevel, parse_evidence, trigger_caption};

/// One numeric field per evidence node plus the trigger.
#[component]
pub fn EvidenceForm<F>(
	fields: Vec<(NodeId, RwSignal<String>)>,
	busy: RwSignal<bool>,
	on_submit: F,
) -> impl IntoView
where
	F: Fn() + 'static,
{
	let rows = fields
		.into_iter()
		.map(|(id, value)| {
			let level = move || EvidenceLevel::of(parse_evidence(Some(&value.get()))).label();
			view! {
				<label class="evidence-row">
					<span class="evidence-name">{id.base_label()}</span>
					<input
						id=id.input_element_id()
						type="number"
						min="0"
						max="1"
						step="0.01"
						prop:value=move || value.get()
						on:input=move |ev| value.set(event_target_value(&ev))
					/>
					<span class="evidence-level">{level}</span>
				</label>
			}
		})
		.collect_view();

	view! {
		<form class="evidence-form" on:submit=|ev| ev.prevent_default()>
			{rows}
			<button
				id="update-button"
				type="button"
				disabled=move || busy.get()
				on:click=move |_| on_submit()
			>
				{move || trigger_caption(busy.get())}
			</button>
		</form>
	}
}
